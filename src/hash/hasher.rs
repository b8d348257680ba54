//! The hasher boundary: turning input into filter bit indices.
//!
//! A [`BitHasher`] produces, for a given [`Shape`], the sequence of bit
//! indices to enable in a filter. Order is unspecified and duplicates are
//! permitted; every index must be in `[0, shape.bits())`. Each hasher also
//! declares a hash *identity*, an opaque token naming the procedure that
//! produced its base material, and filter construction rejects a hasher
//! whose identity does not match the shape's.
//!
//! The workhorse implementation is [`DoubleHasher`]: a 128-bit base hash
//! split into two 64-bit halves and expanded to `k` indices with enhanced
//! double hashing:
//!
//! ```text
//! gᵢ = (h₁ + i·h₂ + (i² + i)/2) mod m
//! ```
//!
//! The quadratic term breaks the index-clustering that plain double hashing
//! exhibits for small `m` or large `k`.
//!
//! # References
//!
//! - Kirsch & Mitzenmacher (2006). "Less Hashing, Same Performance:
//!   Building a Better Bloom Filter"
//! - Dillinger & Manolios (2004). "Fast and Accurate Bitstate Verification
//!   for SPIN"

use crate::core::Shape;

/// Produces filter bit indices for a shape.
///
/// Implementations must be deterministic: the same hasher queried twice under
/// the same shape yields the same index multiset.
pub trait BitHasher {
    /// Identity token of the hash procedure. Must match the shape's
    /// identity for the hasher to be usable with filters of that shape.
    fn identity(&self) -> &str;

    /// Bit indices to enable, each in `[0, shape.bits())`.
    ///
    /// Order is unspecified; duplicates are permitted and collapse when the
    /// filter is built.
    fn indices(&self, shape: &Shape) -> Vec<usize>;
}

/// Enhanced double hasher over a 128-bit base hash.
///
/// # Examples
///
/// ```
/// use bloomdex::hash::{BitHasher, DoubleHasher};
/// use bloomdex::Shape;
///
/// let shape = Shape::new("xxh3-128-edh", 1000, 7).unwrap();
/// let hasher = DoubleHasher::new(0x0123_4567, 0x89ab_cdef);
/// let indices = hasher.indices(&shape);
/// assert_eq!(indices.len(), 7);
/// assert!(indices.iter().all(|&i| i < 1000));
/// ```
#[derive(Debug, Clone)]
pub struct DoubleHasher {
    identity: String,
    h1: u64,
    h2: u64,
}

impl DoubleHasher {
    /// Create a hasher from two base hash halves under the default
    /// [`XXH3_EDH`](crate::hash::XXH3_EDH) identity.
    #[must_use]
    pub fn new(h1: u64, h2: u64) -> Self {
        Self::with_identity(crate::hash::XXH3_EDH, h1, h2)
    }

    /// Create a hasher with an explicit identity token, for callers that
    /// supply base hashes from their own hash procedure.
    #[must_use]
    pub fn with_identity(identity: impl Into<String>, h1: u64, h2: u64) -> Self {
        Self {
            identity: identity.into(),
            h1,
            h2,
        }
    }

    /// The two base hash halves.
    #[must_use]
    pub fn base(&self) -> (u64, u64) {
        (self.h1, self.h2)
    }
}

impl BitHasher for DoubleHasher {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn indices(&self, shape: &Shape) -> Vec<usize> {
        let m = shape.bits() as u64;
        let k = shape.hashes();
        let mut out = Vec::with_capacity(k);
        for i in 0..k as u64 {
            // g_i = h1 + i*h2 + (i^2 + i)/2, all mod 2^64, then mod m
            let hash = self
                .h1
                .wrapping_add(i.wrapping_mul(self.h2))
                .wrapping_add(i.wrapping_mul(i).wrapping_add(i) / 2);
            out.push((hash % m) as usize);
        }
        out
    }
}

/// A hasher that yields a fixed set of indices regardless of the shape's
/// hash count.
///
/// Useful for deterministic queries over known bit positions (and throughout
/// the test suites); the caller is responsible for keeping the indices inside
/// the shape.
#[derive(Debug, Clone)]
pub struct FixedHasher {
    identity: String,
    indices: Vec<usize>,
}

impl FixedHasher {
    /// Create a fixed hasher with the given identity and indices.
    #[must_use]
    pub fn new(identity: impl Into<String>, indices: &[usize]) -> Self {
        Self {
            identity: identity.into(),
            indices: indices.to_vec(),
        }
    }
}

impl BitHasher for FixedHasher {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn indices(&self, _shape: &Shape) -> Vec<usize> {
        self.indices.clone()
    }
}
