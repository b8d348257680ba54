//! The container: one index, one storage, one gate.
//!
//! ```text
//! container/
//! ├── gate.rs - Counting-Bloom fast-reject gate
//! └── mod.rs  - This file (Container)
//! ```
//!
//! A [`Container`] stores values addressed by Bloom filters. `put` derives a
//! filter from the caller's hasher under the container's shape, registers it
//! with the index (deduplicating identical patterns into one slot) and
//! appends the value to that slot's group in storage. `get`, `remove` and
//! `search` first consult the gate: a gate rejection proves no match exists
//! and skips the index entirely.
//!
//! # Concurrency
//!
//! None. All operations are synchronous, CPU-bound bit arithmetic over
//! structures mutated in place; a container shared between threads must sit
//! behind a single mutual-exclusion boundary owned by the caller.
//!
//! # Examples
//!
//! ```
//! use bloomdex::container::Container;
//! use bloomdex::hash::{hasher_for, XXH3_EDH};
//! use bloomdex::index::FlatBloofi;
//! use bloomdex::storage::InMemoryStorage;
//! use bloomdex::Shape;
//!
//! let shape = Shape::from_pop(XXH3_EDH, 1000, 0.01).unwrap();
//! let index = FlatBloofi::new(shape.clone());
//! let mut container =
//!     Container::new(shape, InMemoryStorage::new(), index).unwrap();
//!
//! container.put(&hasher_for("Hello World"), "Hello World").unwrap();
//! let found: Vec<&&str> = container.get(&hasher_for("Hello World")).unwrap().collect();
//! assert_eq!(found, vec![&"Hello World"]);
//! ```

pub mod gate;

pub use gate::CountingGate;

use crate::core::{Filter, Shape};
use crate::error::{BloomdexError, Result};
use crate::hash::BitHasher;
use crate::index::{FilterIndex, SlotId};
use crate::storage::Storage;
use std::marker::PhantomData;

/// Multidimensional Bloom filter container.
///
/// Type parameters: `E` the stored value type, `S` the storage backend,
/// `X` the index strategy.
#[derive(Debug)]
pub struct Container<E, S, X>
where
    S: Storage<E>,
    X: FilterIndex,
{
    shape: Shape,
    storage: S,
    index: X,
    gate: CountingGate,
    value_count: usize,
    _values: PhantomData<E>,
}

impl<E, S, X> Container<E, S, X>
where
    S: Storage<E>,
    X: FilterIndex,
{
    /// Create a container, sizing the gate from the shape's design
    /// population.
    ///
    /// The gate is population-sensitive: undersizing it costs extra index
    /// consultations, never correctness. Use
    /// [`with_population`](Self::with_population) when a better estimate is
    /// known.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::ShapeMismatch`] if the index was built for a
    /// different shape.
    pub fn new(shape: Shape, storage: S, index: X) -> Result<Self> {
        let population = shape.design_population();
        Self::with_population(population, shape, storage, index)
    }

    /// Create a container with an explicit estimated population for gate
    /// sizing.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::ShapeMismatch`] if the index was built for a
    /// different shape; [`BloomdexError::InvalidItemCount`] if the estimate
    /// is zero.
    pub fn with_population(
        estimated_population: usize,
        shape: Shape,
        storage: S,
        index: X,
    ) -> Result<Self> {
        if index.shape() != &shape {
            return Err(BloomdexError::shape_mismatch(format!(
                "index shape {} does not match container shape {}",
                index.shape(),
                shape
            )));
        }
        let probability = shape.probability(shape.design_population());
        let gate = CountingGate::new(shape.hash_identity(), estimated_population, probability)?;
        Ok(Self {
            shape,
            storage,
            index,
            gate,
            value_count: 0,
            _values: PhantomData,
        })
    }

    /// The container's filter shape.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of values stored (across all groups).
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.value_count
    }

    /// Number of distinct filters stored.
    #[must_use]
    pub fn filter_count(&self) -> usize {
        self.index.filter_count()
    }

    /// Store a value under the filter its hasher derives.
    ///
    /// Values hashing to an identical filter share one index slot and
    /// accumulate in one group.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::ShapeMismatch`] if the hasher's identity does not
    /// match the container's shape.
    pub fn put<H: BitHasher + ?Sized>(&mut self, hasher: &H, value: E) -> Result<()> {
        let filter = Filter::from_hasher(hasher, &self.shape)?;
        self.gate.merge(hasher);
        let slot = self.index.put(&filter)?;
        self.storage.put(slot, value);
        self.value_count += 1;
        Ok(())
    }

    /// The values whose stored filter is bitwise identical to the hasher's.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::ShapeMismatch`] if the hasher's identity does not
    /// match the container's shape.
    pub fn get<H: BitHasher + ?Sized>(&self, hasher: &H) -> Result<std::slice::Iter<'_, E>> {
        let filter = Filter::from_hasher(hasher, &self.shape)?;
        let group: &[E] = if self.gate.passes(hasher) {
            match self.index.get(&filter)? {
                Some(slot) => self.storage.get(slot),
                None => &[],
            }
        } else {
            &[]
        };
        Ok(group.iter())
    }

    /// Remove one occurrence of `value` from the group of the hasher's
    /// exact filter. A missing filter or value is a no-op.
    ///
    /// When the group drains empty its index slot is released for reuse.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::ShapeMismatch`] if the hasher's identity does not
    /// match the container's shape.
    pub fn remove<H: BitHasher + ?Sized>(&mut self, hasher: &H, value: &E) -> Result<()> {
        let filter = Filter::from_hasher(hasher, &self.shape)?;
        if !self.gate.passes(hasher) {
            return Ok(());
        }
        let Some(slot) = self.index.get(&filter)? else {
            return Ok(());
        };
        let outcome = self.storage.remove(slot, value);
        if outcome.removed {
            self.value_count -= 1;
            self.gate.subtract(hasher);
            if outcome.now_empty {
                self.index.remove(slot);
            }
        }
        Ok(())
    }

    /// The values of every stored filter that is a superset of the hasher's
    /// bits. An empty hasher matches every stored value.
    ///
    /// Value groups are fetched lazily as the returned iterator advances.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::ShapeMismatch`] if the hasher's identity does not
    /// match the container's shape.
    pub fn search<H: BitHasher + ?Sized>(&self, hasher: &H) -> Result<SearchIter<'_, E, S>> {
        let filter = Filter::from_hasher(hasher, &self.shape)?;
        let slots: Vec<SlotId> = if self.gate.passes(hasher) {
            self.index.search(&filter)?.into_iter().collect()
        } else {
            Vec::new()
        };
        Ok(SearchIter {
            storage: &self.storage,
            slots: slots.into_iter(),
            current: Default::default(),
        })
    }
}

/// Lazily chains the value groups of the slots a search matched.
pub struct SearchIter<'a, E, S: Storage<E>> {
    storage: &'a S,
    slots: std::vec::IntoIter<SlotId>,
    current: std::slice::Iter<'a, E>,
}

impl<'a, E, S: Storage<E>> Iterator for SearchIter<'a, E, S> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        loop {
            if let Some(value) = self.current.next() {
                return Some(value);
            }
            let slot = self.slots.next()?;
            self.current = self.storage.get(slot).iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{hasher_for, FixedHasher, XXH3_EDH};
    use crate::index::Linear;
    use crate::storage::InMemoryStorage;

    fn container() -> Container<&'static str, InMemoryStorage<&'static str>, Linear> {
        let shape = Shape::from_pop(XXH3_EDH, 1000, 0.01).unwrap();
        let index = Linear::new(shape.clone());
        Container::new(shape, InMemoryStorage::new(), index).unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let mut c = container();
        c.put(&hasher_for("Hello World"), "Hello World").unwrap();
        let found: Vec<_> = c.get(&hasher_for("Hello World")).unwrap().collect();
        assert_eq!(found, vec![&"Hello World"]);
    }

    #[test]
    fn test_get_unknown_is_empty() {
        let c = container();
        assert_eq!(c.get(&hasher_for("nothing")).unwrap().count(), 0);
    }

    #[test]
    fn test_value_group_accumulates() {
        let mut c = container();
        c.put(&hasher_for("key"), "first").unwrap();
        c.put(&hasher_for("key"), "second").unwrap();

        assert_eq!(c.value_count(), 2);
        assert_eq!(c.filter_count(), 1);
        assert_eq!(c.get(&hasher_for("key")).unwrap().count(), 2);
    }

    #[test]
    fn test_remove_value_then_slot() {
        let mut c = container();
        c.put(&hasher_for("key"), "first").unwrap();
        c.put(&hasher_for("key"), "second").unwrap();

        c.remove(&hasher_for("key"), &"first").unwrap();
        assert_eq!(c.value_count(), 1);
        assert_eq!(c.filter_count(), 1);

        c.remove(&hasher_for("key"), &"second").unwrap();
        assert_eq!(c.value_count(), 0);
        assert_eq!(c.filter_count(), 0);
        assert_eq!(c.get(&hasher_for("key")).unwrap().count(), 0);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut c = container();
        c.put(&hasher_for("key"), "value").unwrap();
        c.remove(&hasher_for("key"), &"other").unwrap();
        c.remove(&hasher_for("unknown"), &"value").unwrap();
        assert_eq!(c.value_count(), 1);
    }

    #[test]
    fn test_search_empty_hasher_returns_everything() {
        let mut c = container();
        c.put(&hasher_for("a"), "a").unwrap();
        c.put(&hasher_for("b"), "b").unwrap();

        let empty = crate::hash::collection_for(&[]);
        let mut all: Vec<&str> = c.search(&empty).unwrap().copied().collect();
        all.sort_unstable();
        assert_eq!(all, vec!["a", "b"]);
    }

    #[test]
    fn test_identity_mismatch_rejected() {
        let mut c = container();
        let foreign = FixedHasher::new("other-hash", &[1, 2]);
        assert!(c.put(&foreign, "x").is_err());
        assert!(c.get(&foreign).is_err());
        assert!(c.search(&foreign).is_err());
    }

    #[test]
    fn test_mismatched_index_shape_rejected() {
        let shape = Shape::from_pop(XXH3_EDH, 1000, 0.01).unwrap();
        let other = Shape::from_pop(XXH3_EDH, 2000, 0.01).unwrap();
        let index = Linear::new(other);
        let result: Result<Container<&str, _, _>> =
            Container::new(shape, InMemoryStorage::new(), index);
        assert!(matches!(result, Err(BloomdexError::ShapeMismatch { .. })));
    }
}
