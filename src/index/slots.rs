//! Slot allocation shared by the bitmap-backed index strategies.
//!
//! FlatBloofi, BlockedSetIndex and RangePacked all assign each distinct
//! filter a small numeric slot, recycle slots freed by removal, and extend
//! their slot range 64 at a time. That bookkeeping lives here once: a busy
//! [`BitVec`] where a set bit means the slot is live.
//!
//! Recycling invariant: a released slot id may be handed out again by the
//! very next [`allocate`](SlotAllocator::allocate), so owners must tear down
//! all structural data for a slot before releasing it.

use crate::core::BitVec;

/// Free-list slot allocator over a busy bit set.
#[derive(Debug, Clone, Default)]
pub struct SlotAllocator {
    busy: BitVec,
}

impl SlotAllocator {
    /// Create an allocator with no slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a slot: the lowest free id, extending the range by 64 when
    /// every existing slot is live.
    pub fn allocate(&mut self) -> usize {
        match self.busy.next_unset_bit(0) {
            Some(idx) => {
                self.busy.set(idx);
                idx
            }
            None => {
                let idx = self.busy.len();
                self.busy.resize(idx + 64);
                self.busy.set(idx);
                idx
            }
        }
    }

    /// Release a slot. Unknown or already-free slots are ignored.
    pub fn release(&mut self, slot: usize) {
        if slot < self.busy.len() {
            self.busy.unset(slot);
        }
    }

    /// `true` when the slot is currently allocated.
    #[must_use]
    pub fn is_live(&self, slot: usize) -> bool {
        self.busy.get(slot)
    }

    /// Number of live slots.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.busy.cardinality()
    }

    /// Total slot range (live + free), always a multiple of 64.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.busy.len()
    }

    /// The busy set itself; search implementations seed their accumulators
    /// from it so free slots can never match.
    #[must_use]
    pub fn busy(&self) -> &BitVec {
        &self.busy
    }

    /// Iterator over live slot indices, ascending.
    pub fn iter_live(&self) -> impl Iterator<Item = usize> + '_ {
        self.busy.iter_set_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_sequential_from_empty() {
        let mut slots = SlotAllocator::new();
        assert_eq!(slots.allocate(), 0);
        assert_eq!(slots.allocate(), 1);
        assert_eq!(slots.allocate(), 2);
        assert_eq!(slots.live_count(), 3);
        assert_eq!(slots.capacity(), 64);
    }

    #[test]
    fn test_release_then_reuse_lowest() {
        let mut slots = SlotAllocator::new();
        for _ in 0..5 {
            slots.allocate();
        }
        slots.release(1);
        slots.release(3);
        assert_eq!(slots.allocate(), 1);
        assert_eq!(slots.allocate(), 3);
        assert_eq!(slots.allocate(), 5);
    }

    #[test]
    fn test_extends_by_64_when_full() {
        let mut slots = SlotAllocator::new();
        for i in 0..64 {
            assert_eq!(slots.allocate(), i);
        }
        assert_eq!(slots.capacity(), 64);
        assert_eq!(slots.allocate(), 64);
        assert_eq!(slots.capacity(), 128);
    }

    #[test]
    fn test_release_unknown_is_noop() {
        let mut slots = SlotAllocator::new();
        slots.allocate();
        slots.release(1000);
        assert_eq!(slots.live_count(), 1);
    }

    #[test]
    fn test_iter_live() {
        let mut slots = SlotAllocator::new();
        for _ in 0..4 {
            slots.allocate();
        }
        slots.release(2);
        let live: Vec<usize> = slots.iter_live().collect();
        assert_eq!(live, vec![0, 1, 3]);
    }
}
