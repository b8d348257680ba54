//! FlatBloofi: the transposed bitmap index.
//!
//! Instead of storing one bit vector per filter, the representation is
//! transposed: slots are grouped into pages of 64, and each page holds one
//! 64-bit word *per filter bit position*. Bit `s` of `page[b]` records
//! whether the filter in slot `s` of that page has bit `b` set.
//!
//! Search then collapses to word arithmetic: AND together the words at every
//! query-set bit position and each surviving bit of the accumulator is a
//! matching slot. Costs: insert O(k), search O(pages × k), memory
//! O(m × N / 64) words.

use crate::core::{Filter, Shape};
use crate::error::Result;
use crate::index::slots::SlotAllocator;
use crate::index::{check_shape, FilterIndex, SlotId};
use std::collections::HashSet;

const SLOTS_PER_PAGE: usize = 64;

/// Transposed bitmap index over pages of 64 slots.
///
/// # Examples
///
/// ```
/// use bloomdex::index::{FilterIndex, FlatBloofi};
/// use bloomdex::hash::hasher_for;
/// use bloomdex::{Filter, Shape};
///
/// let shape = Shape::new(bloomdex::hash::XXH3_EDH, 64, 3).unwrap();
/// let mut index = FlatBloofi::new(shape.clone());
/// let filter = Filter::from_hasher(&hasher_for("Hello World"), &shape).unwrap();
///
/// let slot = index.put(&filter).unwrap();
/// assert!(index.search(&filter).unwrap().contains(&slot));
/// ```
#[derive(Debug)]
pub struct FlatBloofi {
    shape: Shape,
    /// One entry per 64-slot page; each page holds `shape.bits()` words.
    pages: Vec<Vec<u64>>,
    slots: SlotAllocator,
}

impl FlatBloofi {
    /// Create an empty index for filters of `shape`.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            pages: Vec::new(),
            slots: SlotAllocator::new(),
        }
    }

    /// Set the slot's membership bit in every word matching a set filter bit.
    fn set_filter_at(&mut self, slot: usize, filter: &Filter) {
        let page = &mut self.pages[slot / SLOTS_PER_PAGE];
        let mask = 1u64 << (slot % SLOTS_PER_PAGE);
        for bit in filter.iter_set_bits() {
            page[bit] |= mask;
        }
    }

    /// Clear the slot's membership bit across the whole page.
    fn clear_filter_at(&mut self, slot: usize) {
        let page = &mut self.pages[slot / SLOTS_PER_PAGE];
        let mask = !(1u64 << (slot % SLOTS_PER_PAGE));
        for word in page.iter_mut() {
            *word &= mask;
        }
    }

    /// Push accumulator survivors into the result set via lowest-bit
    /// extraction.
    fn collect_slots(page_idx: usize, mut acc: u64, out: &mut HashSet<SlotId>) {
        while acc != 0 {
            let lowest = acc & acc.wrapping_neg();
            out.insert(SlotId::new(
                page_idx * SLOTS_PER_PAGE + lowest.trailing_zeros() as usize,
            ));
            acc ^= lowest;
        }
    }
}

impl FilterIndex for FlatBloofi {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn get(&self, query: &Filter) -> Result<Option<SlotId>> {
        check_shape(&self.shape, query)?;
        let mut found: Option<SlotId> = None;
        for (page_idx, page) in self.pages.iter().enumerate() {
            // Seed from the busy word so free slots can never survive.
            let mut acc = self.slots.busy().word(page_idx);
            for bit in 0..self.shape.bits() {
                if acc == 0 {
                    break;
                }
                // Exact match: a set query bit demands the word as-is, an
                // unset one demands its complement.
                let word = page[bit];
                acc &= if query.get(bit) { word } else { !word };
            }
            while acc != 0 {
                let lowest = acc & acc.wrapping_neg();
                let slot = SlotId::new(page_idx * SLOTS_PER_PAGE + lowest.trailing_zeros() as usize);
                assert!(
                    found.is_none(),
                    "duplicate filter stored at {} and {}: insert invariant broken",
                    found.unwrap(),
                    slot
                );
                found = Some(slot);
                acc ^= lowest;
            }
        }
        Ok(found)
    }

    fn put(&mut self, filter: &Filter) -> Result<SlotId> {
        if let Some(existing) = self.get(filter)? {
            return Ok(existing);
        }
        let slot = self.slots.allocate();
        if self.pages.len() <= slot / SLOTS_PER_PAGE {
            self.pages.push(vec![0u64; self.shape.bits()]);
        }
        self.set_filter_at(slot, filter);
        Ok(SlotId::new(slot))
    }

    fn remove(&mut self, slot: SlotId) {
        let idx = slot.index();
        if self.slots.is_live(idx) {
            self.clear_filter_at(idx);
            self.slots.release(idx);
        }
    }

    fn search(&self, query: &Filter) -> Result<HashSet<SlotId>> {
        check_shape(&self.shape, query)?;
        let mut result = HashSet::new();
        for (page_idx, page) in self.pages.iter().enumerate() {
            let mut acc = self.slots.busy().word(page_idx);
            for bit in query.iter_set_bits() {
                acc &= page[bit];
                if acc == 0 {
                    break;
                }
            }
            Self::collect_slots(page_idx, acc, &mut result);
        }
        Ok(result)
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
        Shape::new("fixed", 72, 3).unwrap()
    }

    fn filter(indices: &[usize]) -> Filter {
        Filter::from_hasher(&FixedHasher::new("fixed", indices), &shape()).unwrap()
    }

    #[test]
    fn test_put_get_roundtrip() {
        let mut index = FlatBloofi::new(shape());
        let f = filter(&[0, 35, 71]);
        let slot = index.put(&f).unwrap();
        assert_eq!(index.get(&f).unwrap(), Some(slot));
    }

    #[test]
    fn test_get_misses_on_partial_match() {
        let mut index = FlatBloofi::new(shape());
        index.put(&filter(&[1, 2])).unwrap();
        assert_eq!(index.get(&filter(&[1])).unwrap(), None);
        assert_eq!(index.get(&filter(&[1, 2, 3])).unwrap(), None);
    }

    #[test]
    fn test_put_dedups() {
        let mut index = FlatBloofi::new(shape());
        let a = index.put(&filter(&[4, 5])).unwrap();
        let b = index.put(&filter(&[5, 4])).unwrap();
        assert_eq!(a, b);
        assert_eq!(index.filter_count(), 1);
    }

    #[test]
    fn test_search_finds_supersets_only() {
        let mut index = FlatBloofi::new(shape());
        let a = index.put(&filter(&[1, 2, 3])).unwrap();
        index.put(&filter(&[2, 9])).unwrap();
        let b = index.put(&filter(&[1, 2])).unwrap();

        let hits = index.search(&filter(&[1, 2])).unwrap();
        assert_eq!(hits, HashSet::from([a, b]));
    }

    #[test]
    fn test_search_empty_query_skips_free_slots() {
        let mut index = FlatBloofi::new(shape());
        let a = index.put(&filter(&[1])).unwrap();
        let b = index.put(&filter(&[2])).unwrap();
        index.remove(a);

        let hits = index.search(&filter(&[])).unwrap();
        assert_eq!(hits, HashSet::from([b]));
    }

    #[test]
    fn test_remove_clears_structure() {
        let mut index = FlatBloofi::new(shape());
        let a = index.put(&filter(&[1, 2])).unwrap();
        index.remove(a);
        assert_eq!(index.get(&filter(&[1, 2])).unwrap(), None);
        assert!(index.search(&filter(&[1])).unwrap().is_empty());

        // recycled slot must not resurrect the old pattern
        let b = index.put(&filter(&[7])).unwrap();
        assert_eq!(b, a);
        assert_eq!(index.get(&filter(&[1, 2])).unwrap(), None);
    }

    #[test]
    fn test_crosses_page_boundary() {
        let mut index = FlatBloofi::new(shape());
        for i in 0..70 {
            index.put(&filter(&[i % 72, (i + 7) % 72])).unwrap();
        }
        assert_eq!(index.filter_count(), 70);
        let all = index.search(&filter(&[])).unwrap();
        assert_eq!(all.len(), 70);
    }
}
