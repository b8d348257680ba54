//! Filter shape: the `(bits, hash count, hash identity)` triple.
//!
//! Two Bloom filters are comparable only when they were built under an
//! identical [`Shape`]. Every index and container carries a shape and rejects
//! filters or hashers built under a different one before mutating any state.
//!
//! The optimal-parameter derivation in [`Shape::from_pop`] implements the
//! standard formulas:
//!
//! ```text
//! m = -n × ln(p) / (ln 2)²      (bits)
//! k = (m/n) × ln 2              (hash functions)
//! ```
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with
//!   Allowable Errors"

use crate::error::{BloomdexError, Result};
use std::f64::consts::LN_2;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mathematical constant: (ln 2)² ≈ 0.4804530139182014.
const LN2_SQUARED: f64 = LN_2 * LN_2;

/// Maximum practical number of hash functions.
///
/// Beyond 32 the computational cost exceeds the marginal false-positive
/// improvement for any realistic shape.
pub const MAX_HASH_FUNCTIONS: usize = 32;

/// Minimum number of hash functions.
pub const MIN_HASH_FUNCTIONS: usize = 1;

/// The shape of a family of compatible Bloom filters.
///
/// Structural equality: two shapes are equal iff bit count, hash count and
/// hash identity all agree. The hash identity is an opaque token naming the
/// hash procedure that produced a filter's bit indices; mixing identities
/// would make bitwise comparison meaningless, so it participates in equality.
///
/// # Examples
///
/// ```
/// use bloomdex::Shape;
///
/// let shape = Shape::new("xxh3-128-edh", 20, 2).unwrap();
/// assert_eq!(shape.bits(), 20);
/// assert_eq!(shape.hashes(), 2);
/// assert_eq!(shape.byte_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shape {
    hash_identity: String,
    bits: usize,
    hashes: usize,
}

impl Shape {
    /// Create a shape from explicit parameters.
    ///
    /// # Errors
    ///
    /// - [`BloomdexError::InvalidFilterSize`] if `bits == 0`
    /// - [`BloomdexError::InvalidHashCount`] if `hashes` is outside
    ///   `[MIN_HASH_FUNCTIONS, MAX_HASH_FUNCTIONS]`
    pub fn new(hash_identity: impl Into<String>, bits: usize, hashes: usize) -> Result<Self> {
        if bits == 0 {
            return Err(BloomdexError::invalid_filter_size(bits));
        }
        if !(MIN_HASH_FUNCTIONS..=MAX_HASH_FUNCTIONS).contains(&hashes) {
            return Err(BloomdexError::invalid_hash_count(
                hashes,
                MIN_HASH_FUNCTIONS,
                MAX_HASH_FUNCTIONS,
            ));
        }
        Ok(Self {
            hash_identity: hash_identity.into(),
            bits,
            hashes,
        })
    }

    /// Derive the optimal shape for an expected population `n` and a target
    /// false-positive probability `p`.
    ///
    /// # Errors
    ///
    /// - [`BloomdexError::InvalidItemCount`] if `n == 0`
    /// - [`BloomdexError::FalsePositiveRateOutOfBounds`] if `p` is not in
    ///   the open interval (0, 1)
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomdex::Shape;
    ///
    /// let shape = Shape::from_pop("xxh3-128-edh", 1000, 0.01).unwrap();
    /// assert!(shape.bits() >= 9585 && shape.bits() <= 9586);
    /// assert_eq!(shape.hashes(), 7);
    /// ```
    pub fn from_pop(hash_identity: impl Into<String>, n: usize, p: f64) -> Result<Self> {
        if n == 0 {
            return Err(BloomdexError::invalid_item_count(n));
        }
        if p <= 0.0 || p >= 1.0 {
            return Err(BloomdexError::fp_rate_out_of_bounds(p));
        }

        let n_f64 = n as f64;
        let m = (-n_f64 * p.ln()) / LN2_SQUARED;
        if !m.is_finite() || m > (usize::MAX / 2) as f64 {
            return Err(BloomdexError::invalid_parameters(format!(
                "calculated filter size {:.0} exceeds reasonable bounds",
                m
            )));
        }
        let bits = (m.ceil() as usize).max(1);

        // k = (m/n) ln 2, at least one hash function.
        let k = ((bits as f64 / n_f64) * LN_2).round() as usize;
        let hashes = k.clamp(MIN_HASH_FUNCTIONS, MAX_HASH_FUNCTIONS);

        Self::new(hash_identity, bits, hashes)
    }

    /// Number of bits (`m`) in filters of this shape.
    #[must_use]
    #[inline]
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Number of hash functions (`k`) used to populate a filter.
    #[must_use]
    #[inline]
    pub fn hashes(&self) -> usize {
        self.hashes
    }

    /// Identity token of the hash procedure for this shape.
    #[must_use]
    #[inline]
    pub fn hash_identity(&self) -> &str {
        &self.hash_identity
    }

    /// Number of whole bytes needed to cover `bits` (`ceil(m / 8)`).
    #[must_use]
    #[inline]
    pub fn byte_count(&self) -> usize {
        self.bits.div_ceil(8)
    }

    /// Number of 64-bit words needed to cover `bits`.
    #[must_use]
    #[inline]
    pub fn word_count(&self) -> usize {
        self.bits.div_ceil(64)
    }

    /// The population this shape is optimal for, `(m/k) × ln 2`.
    ///
    /// For a shape built with [`Shape::from_pop`] this recovers (close to)
    /// the population it was derived from; the container sizes its gate from
    /// it when no explicit estimate is given.
    #[must_use]
    pub fn design_population(&self) -> usize {
        let n = (self.bits as f64 / self.hashes as f64) * LN_2;
        (n.round() as usize).max(1)
    }

    /// Expected false-positive probability after `n` insertions,
    /// `(1 - e^(-kn/m))^k`.
    ///
    /// Informational only; no behavior in the crate depends on it beyond
    /// gate sizing.
    #[must_use]
    pub fn probability(&self, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let k = self.hashes as f64;
        let exponent = -k * (n as f64) / (self.bits as f64);
        (1.0 - exponent.exp()).powf(k)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Shape[{} m={} k={}]",
            self.hash_identity, self.bits, self.hashes
        )
    }
}
