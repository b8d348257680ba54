//! Merging several hashers into one filter.
//!
//! A value is often addressed by more than one feature token: indexing
//! "Hello World" under both "Hello" and "World" so a later search on either
//! term matches. A [`HasherCollection`] holds any number of hashers sharing
//! one identity and yields the union of their indices, producing a single
//! merged filter.

use crate::core::Shape;
use crate::error::{BloomdexError, Result};
use crate::hash::BitHasher;

/// A collection of hashers whose indices are merged into one filter.
///
/// An empty collection is a valid hasher: it yields no indices and builds
/// the empty filter, the query that superset-matches everything.
///
/// # Examples
///
/// ```
/// use bloomdex::hash::{collection_for, BitHasher};
/// use bloomdex::Shape;
///
/// let shape = Shape::new(bloomdex::hash::XXH3_EDH, 1000, 3).unwrap();
/// let hashers = collection_for(&["Hello", "World"]);
/// assert!(hashers.indices(&shape).len() <= 6);
/// ```
pub struct HasherCollection {
    identity: String,
    hashers: Vec<Box<dyn BitHasher>>,
}

impl HasherCollection {
    /// Create an empty collection under the given identity.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            hashers: Vec::new(),
        }
    }

    /// Add a hasher to the collection.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::ShapeMismatch`] if the hasher's identity differs
    /// from the collection's.
    pub fn add(&mut self, hasher: impl BitHasher + 'static) -> Result<()> {
        if hasher.identity() != self.identity {
            return Err(BloomdexError::shape_mismatch(format!(
                "hasher identity '{}' does not match collection identity '{}'",
                hasher.identity(),
                self.identity
            )));
        }
        self.hashers.push(Box::new(hasher));
        Ok(())
    }

    /// Number of member hashers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hashers.len()
    }

    /// `true` when the collection has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hashers.is_empty()
    }
}

impl BitHasher for HasherCollection {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn indices(&self, shape: &Shape) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.hashers.len() * shape.hashes());
        for hasher in &self.hashers {
            out.extend(hasher.indices(shape));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::FixedHasher;

    #[test]
    fn test_merges_member_indices() {
        let mut collection = HasherCollection::new("fixed");
        collection.add(FixedHasher::new("fixed", &[1, 2])).unwrap();
        collection.add(FixedHasher::new("fixed", &[2, 9])).unwrap();

        let shape = Shape::new("fixed", 64, 2).unwrap();
        let mut indices = collection.indices(&shape);
        indices.sort_unstable();
        assert_eq!(indices, vec![1, 2, 2, 9]);
    }

    #[test]
    fn test_empty_collection_yields_no_indices() {
        let collection = HasherCollection::new("fixed");
        let shape = Shape::new("fixed", 64, 2).unwrap();
        assert!(collection.indices(&shape).is_empty());
        assert!(collection.is_empty());
    }

    #[test]
    fn test_rejects_mismatched_identity() {
        let mut collection = HasherCollection::new("fixed");
        let err = collection
            .add(FixedHasher::new("other", &[1]))
            .unwrap_err();
        assert!(matches!(err, BloomdexError::ShapeMismatch { .. }));
        assert_eq!(collection.len(), 0);
    }
}
