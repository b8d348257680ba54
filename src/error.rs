//! Error types for bloomdex operations.
//!
//! All fallible operations in the crate return [`Result<T>`] with
//! [`BloomdexError`] as the error type. These errors describe contract
//! violations (mismatched shapes, invalid construction parameters, hasher
//! indices outside the filter) rather than transient failures: there is
//! nothing to retry, the caller's usage is wrong.
//!
//! One condition is deliberately *not* represented here: an exact lookup that
//! structurally matches more than one stored filter. That can only happen if
//! an index implementation is broken or a duplicate slipped past insertion
//! dedup, and continuing would return ambiguous data, so index
//! implementations panic instead of returning an error.
//!
//! # Error Propagation
//!
//! ```
//! use bloomdex::{Result, Shape};
//!
//! fn shape_for(n: usize, p: f64) -> Result<Shape> {
//!     Shape::from_pop("xxh3-128-edh", n, p)
//! }
//! # assert!(shape_for(1000, 0.01).is_ok());
//! ```

use std::fmt;

/// Result type alias for bloomdex operations.
pub type Result<T> = std::result::Result<T, BloomdexError>;

/// Errors raised by bloomdex contract violations.
///
/// `Clone` + `PartialEq` enable testing and error comparison; every variant
/// carries the context needed to diagnose the misuse.
#[derive(Debug, Clone, PartialEq)]
pub enum BloomdexError {
    /// Construction parameters do not describe a usable filter or index.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// False positive rate outside the open interval (0, 1).
    FalsePositiveRateOutOfBounds {
        /// The invalid rate that was provided.
        fp_rate: f64,
    },

    /// Estimated population of zero.
    InvalidItemCount {
        /// The invalid count that was provided.
        count: usize,
    },

    /// Number of hash functions outside the supported range.
    InvalidHashCount {
        /// The invalid hash count provided.
        count: usize,
        /// Minimum allowed value.
        min: usize,
        /// Maximum allowed value.
        max: usize,
    },

    /// Filter bit count of zero or beyond memory limits.
    InvalidFilterSize {
        /// The invalid size in bits.
        size: usize,
    },

    /// An operation mixed participants built under different shapes, or a
    /// hasher whose identity does not match the receiver's shape.
    ///
    /// Filters, indexes, and containers interoperate only under an identical
    /// `(bits, hashes, hash identity)` triple; the operation fails before any
    /// state is mutated.
    ShapeMismatch {
        /// Description of the mismatch, naming both sides.
        reason: String,
    },

    /// A hasher produced a bit index at or beyond the shape's bit count.
    IndexOutOfBounds {
        /// The offending bit index.
        index: usize,
        /// The shape's number of bits.
        bits: usize,
    },
}

impl fmt::Display for BloomdexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { message } => {
                write!(f, "Invalid parameters: {}.", message)
            }
            Self::FalsePositiveRateOutOfBounds { fp_rate } => {
                write!(
                    f,
                    "False positive rate {} is out of bounds. Must be in range (0, 1).",
                    fp_rate
                )
            }
            Self::InvalidItemCount { count } => {
                write!(
                    f,
                    "Invalid item count: {}. Estimated population must be greater than 0.",
                    count
                )
            }
            Self::InvalidHashCount { count, min, max } => {
                write!(
                    f,
                    "Invalid hash function count: {}. Must be in range [{}, {}].",
                    count, min, max
                )
            }
            Self::InvalidFilterSize { size } => {
                write!(
                    f,
                    "Invalid filter size: {} bits. Must be positive and within memory limits.",
                    size
                )
            }
            Self::ShapeMismatch { reason } => {
                write!(f, "Shape mismatch: {}.", reason)
            }
            Self::IndexOutOfBounds { index, bits } => {
                write!(
                    f,
                    "Hash index {} out of bounds for a filter of {} bits",
                    index, bits
                )
            }
        }
    }
}

impl std::error::Error for BloomdexError {}

impl BloomdexError {
    /// Create an `InvalidParameters` error with a formatted message.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }

    /// Create an `InvalidItemCount` error.
    #[must_use]
    pub fn invalid_item_count(count: usize) -> Self {
        Self::InvalidItemCount { count }
    }

    /// Create an `InvalidHashCount` error.
    #[must_use]
    pub fn invalid_hash_count(count: usize, min: usize, max: usize) -> Self {
        Self::InvalidHashCount { count, min, max }
    }

    /// Create an `InvalidFilterSize` error.
    #[must_use]
    pub fn invalid_filter_size(size: usize) -> Self {
        Self::InvalidFilterSize { size }
    }

    /// Create a `ShapeMismatch` error.
    #[must_use]
    pub fn shape_mismatch(reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            reason: reason.into(),
        }
    }

    /// Create an `IndexOutOfBounds` error.
    #[must_use]
    pub fn index_out_of_bounds(index: usize, bits: usize) -> Self {
        Self::IndexOutOfBounds { index, bits }
    }
}
