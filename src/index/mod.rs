//! Index strategies: locating stored filters by exact or superset match.
//!
//! ```text
//! index/
//! ├── mod.rs          - FilterIndex trait, SlotId
//! ├── slots.rs        - Shared slot allocator (busy set + free-slot reuse)
//! ├── tables.rs       - Precomputed superset-expansion tables
//! ├── linear.rs       - O(N) scan baseline
//! ├── flat.rs         - FlatBloofi transposed bitmap
//! ├── blocked.rs      - Byte-blocked bitmap table
//! ├── range_packed.rs - Per-bit-position bitmaps
//! └── trie.rs         - Chunked n-ary trie (width 4 or 8)
//! ```
//!
//! All five structures implement the same [`FilterIndex`] contract and are
//! interchangeable behind it; they differ only in how memory, insert cost and
//! search cost trade off. `Linear` is the correctness oracle the others are
//! tested against.
//!
//! # Contract highlights
//!
//! - `put` deduplicates on filter equality: inserting a bit pattern that is
//!   already stored returns the existing slot.
//! - `get` is exact (bitwise) match; if an implementation ever shortlists two
//!   distinct slots holding the identical pattern it panics, because that can
//!   only follow from a broken insert and any answer would be arbitrary.
//! - `search` returns every live slot whose filter is a superset of the
//!   query; the empty query matches every live slot.
//! - `remove` of an unknown or already-free slot is a no-op.

pub mod blocked;
pub mod flat;
pub mod linear;
pub mod range_packed;
pub mod slots;
pub mod tables;
pub mod trie;

pub use blocked::BlockedSetIndex;
pub use flat::FlatBloofi;
pub use linear::Linear;
pub use range_packed::RangePacked;
pub use trie::{ChunkWidth, ChunkedTrie};

use crate::core::{Filter, Shape};
use crate::error::{BloomdexError, Result};
use std::collections::HashSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier of one stored (distinct) filter.
///
/// Slot ids are assigned on first insertion of a new bit pattern and recycled
/// after removal; a released id may later identify an unrelated filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotId(usize);

impl SlotId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// The numeric slot index, for storage backends keyed numerically.
    #[must_use]
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// The contract shared by every index structure.
pub trait FilterIndex {
    /// The shape every stored and queried filter must carry.
    fn shape(&self) -> &Shape;

    /// Exact match: the slot whose stored filter is bitwise identical to
    /// `query`, if one exists.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::ShapeMismatch`] if `query` was built under a
    /// different shape.
    ///
    /// # Panics
    ///
    /// Panics if more than one stored slot holds the identical bit pattern,
    /// an invariant violation signalling a broken insert.
    fn get(&self, query: &Filter) -> Result<Option<SlotId>>;

    /// Insert a filter, returning its slot.
    ///
    /// Idempotent on the bit pattern: if an identical filter is already
    /// stored its existing slot is returned and nothing changes. A freed
    /// slot id is reused before the slot range is extended.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::ShapeMismatch`] if `filter` was built under a
    /// different shape.
    fn put(&mut self, filter: &Filter) -> Result<SlotId>;

    /// Release a slot and its structural data. Unknown or already-free
    /// slots are ignored.
    fn remove(&mut self, slot: SlotId);

    /// Superset search: every live slot whose stored filter has at least the
    /// query's bits set. The empty query matches every live slot.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::ShapeMismatch`] if `query` was built under a
    /// different shape.
    fn search(&self, query: &Filter) -> Result<HashSet<SlotId>>;

    /// Every live slot.
    fn get_all(&self) -> HashSet<SlotId>;

    /// Number of distinct filters currently stored.
    fn filter_count(&self) -> usize;
}

impl<T: FilterIndex + ?Sized> FilterIndex for Box<T> {
    fn shape(&self) -> &Shape {
        (**self).shape()
    }

    fn get(&self, query: &Filter) -> Result<Option<SlotId>> {
        (**self).get(query)
    }

    fn put(&mut self, filter: &Filter) -> Result<SlotId> {
        (**self).put(filter)
    }

    fn remove(&mut self, slot: SlotId) {
        (**self).remove(slot);
    }

    fn search(&self, query: &Filter) -> Result<HashSet<SlotId>> {
        (**self).search(query)
    }

    fn get_all(&self) -> HashSet<SlotId> {
        (**self).get_all()
    }

    fn filter_count(&self) -> usize {
        (**self).filter_count()
    }
}

/// Shared shape guard for index entry points.
pub(crate) fn check_shape(expected: &Shape, filter: &Filter) -> Result<()> {
    if filter.shape() != expected {
        return Err(BloomdexError::shape_mismatch(format!(
            "filter shape {} does not match index shape {}",
            filter.shape(),
            expected
        )));
    }
    Ok(())
}
