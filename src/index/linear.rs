//! Linear-scan index: the O(N) baseline.
//!
//! Stores every filter as-is and answers both lookups by scanning. Adequate
//! for small populations and, because it has no structural cleverness to get
//! wrong, it is the correctness oracle the other strategies are tested
//! against.

use crate::core::{Filter, Shape};
use crate::error::Result;
use crate::index::slots::SlotAllocator;
use crate::index::{check_shape, FilterIndex, SlotId};
use std::collections::HashSet;

/// Baseline index backed by a plain list of stored filters.
///
/// # Examples
///
/// ```
/// use bloomdex::index::{FilterIndex, Linear};
/// use bloomdex::hash::hasher_for;
/// use bloomdex::{Filter, Shape};
///
/// let shape = Shape::new(bloomdex::hash::XXH3_EDH, 64, 3).unwrap();
/// let mut index = Linear::new(shape.clone());
/// let filter = Filter::from_hasher(&hasher_for("Hello World"), &shape).unwrap();
///
/// let slot = index.put(&filter).unwrap();
/// assert_eq!(index.get(&filter).unwrap(), Some(slot));
/// ```
#[derive(Debug)]
pub struct Linear {
    shape: Shape,
    filters: Vec<Option<Filter>>,
    slots: SlotAllocator,
}

impl Linear {
    /// Create an empty linear index for filters of `shape`.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            filters: Vec::new(),
            slots: SlotAllocator::new(),
        }
    }

    fn stored(&self, slot: usize) -> Option<&Filter> {
        if !self.slots.is_live(slot) {
            return None;
        }
        self.filters.get(slot).and_then(Option::as_ref)
    }
}

impl FilterIndex for Linear {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn get(&self, query: &Filter) -> Result<Option<SlotId>> {
        check_shape(&self.shape, query)?;
        let mut found = None;
        for slot in self.slots.iter_live() {
            if self.stored(slot).is_some_and(|stored| stored == query) {
                assert!(
                    found.is_none(),
                    "duplicate filter stored at {} and {}: insert invariant broken",
                    found.unwrap(),
                    SlotId::new(slot)
                );
                found = Some(SlotId::new(slot));
            }
        }
        Ok(found)
    }

    fn put(&mut self, filter: &Filter) -> Result<SlotId> {
        if let Some(existing) = self.get(filter)? {
            return Ok(existing);
        }
        let slot = self.slots.allocate();
        if self.filters.len() <= slot {
            self.filters.resize(slot + 1, None);
        }
        self.filters[slot] = Some(filter.clone());
        Ok(SlotId::new(slot))
    }

    fn remove(&mut self, slot: SlotId) {
        let idx = slot.index();
        if self.slots.is_live(idx) {
            self.filters[idx] = None;
            self.slots.release(idx);
        }
    }

    fn search(&self, query: &Filter) -> Result<HashSet<SlotId>> {
        check_shape(&self.shape, query)?;
        Ok(self
            .slots
            .iter_live()
            .filter(|&slot| {
                self.stored(slot)
                    .is_some_and(|stored| stored.is_superset_of(query))
            })
            .map(SlotId::new)
            .collect())
    }

    fn get_all(&self) -> HashSet<SlotId> {
        self.slots.iter_live().map(SlotId::new).collect()
    }

    fn filter_count(&self) -> usize {
        self.slots.live_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::FixedHasher;

    fn shape() -> Shape {
        Shape::new("fixed", 64, 3).unwrap()
    }

    fn filter(indices: &[usize]) -> Filter {
        Filter::from_hasher(&FixedHasher::new("fixed", indices), &shape()).unwrap()
    }

    #[test]
    fn test_put_get_roundtrip() {
        let mut index = Linear::new(shape());
        let f = filter(&[1, 20, 40]);
        let slot = index.put(&f).unwrap();
        assert_eq!(index.get(&f).unwrap(), Some(slot));
        assert_eq!(index.filter_count(), 1);
    }

    #[test]
    fn test_put_is_idempotent_on_pattern() {
        let mut index = Linear::new(shape());
        let a = index.put(&filter(&[1, 2])).unwrap();
        let b = index.put(&filter(&[2, 1])).unwrap();
        assert_eq!(a, b);
        assert_eq!(index.filter_count(), 1);
    }

    #[test]
    fn test_get_partial_match_misses() {
        let mut index = Linear::new(shape());
        index.put(&filter(&[1, 2])).unwrap();
        assert_eq!(index.get(&filter(&[1, 2, 3])).unwrap(), None);
        assert_eq!(index.get(&filter(&[1])).unwrap(), None);
    }

    #[test]
    fn test_remove_then_slot_reuse() {
        let mut index = Linear::new(shape());
        let a = index.put(&filter(&[1])).unwrap();
        index.put(&filter(&[2])).unwrap();
        index.remove(a);
        assert_eq!(index.get(&filter(&[1])).unwrap(), None);
        assert_eq!(index.filter_count(), 1);

        // lowest free id is recycled
        let c = index.put(&filter(&[3])).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut index = Linear::new(shape());
        index.put(&filter(&[1])).unwrap();
        index.remove(SlotId::new(40));
        assert_eq!(index.filter_count(), 1);
    }

    #[test]
    fn test_search_superset_law() {
        let mut index = Linear::new(shape());
        let a = index.put(&filter(&[1, 2, 3])).unwrap();
        let b = index.put(&filter(&[2, 3])).unwrap();
        index.put(&filter(&[9])).unwrap();

        let hits = index.search(&filter(&[2, 3])).unwrap();
        assert_eq!(hits, HashSet::from([a, b]));
    }

    #[test]
    fn test_search_empty_query_matches_all() {
        let mut index = Linear::new(shape());
        let a = index.put(&filter(&[1])).unwrap();
        let b = index.put(&filter(&[2])).unwrap();
        let hits = index.search(&filter(&[])).unwrap();
        assert_eq!(hits, HashSet::from([a, b]));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let index = Linear::new(shape());
        let other = Shape::new("fixed", 128, 3).unwrap();
        let query = Filter::from_hasher(&FixedHasher::new("fixed", &[1]), &other).unwrap();
        assert!(index.get(&query).is_err());
        assert!(index.search(&query).is_err());
    }
}
