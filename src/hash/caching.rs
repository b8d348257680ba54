//! Index caching for repeatedly-used hashers.
//!
//! Expanding a base hash into indices is cheap but not free; a hasher that
//! drives many operations against the same container can precompute its
//! indices once. [`CachingHasher`] wraps a [`DoubleHasher`] and remembers the
//! expansion for one shape, falling back to recomputation when queried under
//! any other shape (the container's gate, for example, uses a differently
//! sized shape than the index).

use crate::core::Shape;
use crate::hash::{BitHasher, DoubleHasher};

/// A hasher that precomputes its index expansion for one shape.
#[derive(Debug, Clone)]
pub struct CachingHasher {
    inner: DoubleHasher,
    cached_shape: Shape,
    cached: Vec<usize>,
}

impl CachingHasher {
    /// Wrap `inner`, precomputing its indices for `shape`.
    #[must_use]
    pub fn new(inner: DoubleHasher, shape: &Shape) -> Self {
        let cached = inner.indices(shape);
        Self {
            inner,
            cached_shape: shape.clone(),
            cached,
        }
    }

    /// The shape the cached expansion was computed for.
    #[must_use]
    pub fn cached_shape(&self) -> &Shape {
        &self.cached_shape
    }
}

impl BitHasher for CachingHasher {
    fn identity(&self) -> &str {
        self.inner.identity()
    }

    fn indices(&self, shape: &Shape) -> Vec<usize> {
        if *shape == self.cached_shape {
            self.cached.clone()
        } else {
            self.inner.indices(shape)
        }
    }
}
