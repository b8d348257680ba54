//! Per-bit-position bitmap index.
//!
//! One [`BitVec`] per filter bit position records which slots have that bit
//! set; a shared busy set tracks live slots. No byte blocking, no expansion
//! tables: a superset search is just one AND per set query bit against a
//! busy-seeded accumulator.
//!
//! Costs: insert O(k), search O(|query bits|) vector ANDs of N/64 words,
//! memory O(m × N) bits. The hungriest strategy, and the simplest; a good
//! baseline for small `m`.

use crate::core::{BitVec, Filter, Shape};
use crate::error::Result;
use crate::index::slots::SlotAllocator;
use crate::index::{check_shape, FilterIndex, SlotId};
use std::collections::HashSet;

/// Index over one slot bitmap per bit position.
///
/// # Examples
///
/// ```
/// use bloomdex::index::{FilterIndex, RangePacked};
/// use bloomdex::hash::hasher_for;
/// use bloomdex::{Filter, Shape};
///
/// let shape = Shape::new(bloomdex::hash::XXH3_EDH, 64, 3).unwrap();
/// let mut index = RangePacked::new(shape.clone());
/// let filter = Filter::from_hasher(&hasher_for("Hello World"), &shape).unwrap();
///
/// let slot = index.put(&filter).unwrap();
/// assert!(index.search(&filter).unwrap().contains(&slot));
/// ```
#[derive(Debug)]
pub struct RangePacked {
    shape: Shape,
    /// `buffer[b]` holds the slots whose filter has bit `b` set; allocated
    /// lazily the first time a filter sets bit `b`.
    buffer: Vec<Option<BitVec>>,
    slots: SlotAllocator,
}

impl RangePacked {
    /// Create an empty index for filters of `shape`.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        let buffer = vec![None; shape.bits()];
        Self {
            shape,
            buffer,
            slots: SlotAllocator::new(),
        }
    }
}

impl FilterIndex for RangePacked {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn get(&self, query: &Filter) -> Result<Option<SlotId>> {
        check_shape(&self.shape, query)?;
        let mut answer = self.slots.busy().clone();
        for (bit, entry) in self.buffer.iter().enumerate() {
            if query.get(bit) {
                // Every exact match must have this bit.
                let Some(bv) = entry else {
                    return Ok(None);
                };
                answer.and(bv);
            } else if let Some(bv) = entry {
                // ...and must not have any other.
                answer.and_not(bv);
            }
            if answer.is_zero() {
                return Ok(None);
            }
        }

        let mut live = answer.iter_set_bits();
        let first = live.next();
        if let (Some(a), Some(b)) = (first, live.next()) {
            panic!(
                "duplicate filter stored at {} and {}: insert invariant broken",
                SlotId::new(a),
                SlotId::new(b)
            );
        }
        Ok(first.map(SlotId::new))
    }

    fn put(&mut self, filter: &Filter) -> Result<SlotId> {
        if let Some(existing) = self.get(filter)? {
            return Ok(existing);
        }
        let slot = self.slots.allocate();
        for bit in filter.iter_set_bits() {
            let bv = self.buffer[bit].get_or_insert_with(BitVec::new);
            if bv.len() <= slot {
                bv.resize(slot + 1);
            }
            bv.set(slot);
        }
        Ok(SlotId::new(slot))
    }

    fn remove(&mut self, slot: SlotId) {
        let idx = slot.index();
        if !self.slots.is_live(idx) {
            return;
        }
        for bv in self.buffer.iter_mut().flatten() {
            if idx < bv.len() {
                bv.unset(idx);
            }
        }
        self.slots.release(idx);
    }

    fn search(&self, query: &Filter) -> Result<HashSet<SlotId>> {
        check_shape(&self.shape, query)?;
        let mut answer = self.slots.busy().clone();
        for bit in query.iter_set_bits() {
            // No vector here means no stored filter has this bit at all.
            let Some(bv) = &self.buffer[bit] else {
                return Ok(HashSet::new());
            };
            answer.and(bv);
            if answer.is_zero() {
                return Ok(HashSet::new());
            }
        }
        Ok(answer.iter_set_bits().map(SlotId::new).collect())
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
        let mut index = RangePacked::new(shape());
        let f = filter(&[0, 31, 63]);
        let slot = index.put(&f).unwrap();
        assert_eq!(index.get(&f).unwrap(), Some(slot));
    }

    #[test]
    fn test_get_is_exact_not_superset() {
        let mut index = RangePacked::new(shape());
        let a = index.put(&filter(&[1])).unwrap();
        let b = index.put(&filter(&[1, 2])).unwrap();

        assert_eq!(index.get(&filter(&[1])).unwrap(), Some(a));
        assert_eq!(index.get(&filter(&[1, 2])).unwrap(), Some(b));
        assert_eq!(index.get(&filter(&[2])).unwrap(), None);
    }

    #[test]
    fn test_put_dedups() {
        let mut index = RangePacked::new(shape());
        let a = index.put(&filter(&[8, 9])).unwrap();
        let b = index.put(&filter(&[9, 8])).unwrap();
        assert_eq!(a, b);
        assert_eq!(index.filter_count(), 1);
    }

    #[test]
    fn test_search_intersects_positions() {
        let mut index = RangePacked::new(shape());
        let a = index.put(&filter(&[1, 2, 3])).unwrap();
        let b = index.put(&filter(&[1, 2])).unwrap();
        index.put(&filter(&[2, 9])).unwrap();

        assert_eq!(
            index.search(&filter(&[1, 2])).unwrap(),
            HashSet::from([a, b])
        );
    }

    #[test]
    fn test_search_missing_position_short_circuits() {
        let mut index = RangePacked::new(shape());
        index.put(&filter(&[1])).unwrap();
        assert!(index.search(&filter(&[40])).unwrap().is_empty());
    }

    #[test]
    fn test_search_empty_query_matches_live_only() {
        let mut index = RangePacked::new(shape());
        let a = index.put(&filter(&[1])).unwrap();
        let b = index.put(&filter(&[2])).unwrap();
        index.remove(a);
        assert_eq!(index.search(&filter(&[])).unwrap(), HashSet::from([b]));
    }

    #[test]
    fn test_all_zero_query_get_requires_stored_empty() {
        let mut index = RangePacked::new(shape());
        index.put(&filter(&[5])).unwrap();
        // nothing all-zero stored
        assert_eq!(index.get(&filter(&[])).unwrap(), None);

        let empty = index.put(&filter(&[])).unwrap();
        assert_eq!(index.get(&filter(&[])).unwrap(), Some(empty));
    }

    #[test]
    fn test_remove_and_recycle() {
        let mut index = RangePacked::new(shape());
        let a = index.put(&filter(&[1, 2])).unwrap();
        index.remove(a);
        assert_eq!(index.get(&filter(&[1, 2])).unwrap(), None);

        let b = index.put(&filter(&[30])).unwrap();
        assert_eq!(b, a);
        assert!(index.search(&filter(&[1])).unwrap().is_empty());
        assert_eq!(index.search(&filter(&[30])).unwrap(), HashSet::from([b]));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut index = RangePacked::new(shape());
        index.put(&filter(&[1])).unwrap();
        index.remove(SlotId::new(99));
        assert_eq!(index.filter_count(), 1);
    }
}
