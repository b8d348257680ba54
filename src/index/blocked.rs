//! Byte-blocked bitmap index.
//!
//! The filter is chunked into bytes. For every byte position and every
//! non-zero byte value `1..=255`, a [`BitVec`] records which slots hold
//! exactly that byte at that position. The value 0 is never stored: a zero
//! byte matches everything on a superset search, so it contributes no
//! discriminating power.
//!
//! Superset search expands each non-zero query byte into its superset byte
//! values via the precomputed table, unions those per-position vectors, and
//! intersects the unions across positions. Exact lookup is the asymmetric
//! mirror: it ANDs the *exact* value vector at non-zero positions and
//! AND-NOTs the union of every value vector at zero positions, because a
//! zero query byte rules out any slot with a non-zero byte there.

use crate::core::{BitVec, Filter, Shape};
use crate::error::Result;
use crate::index::slots::SlotAllocator;
use crate::index::tables::byte_supersets;
use crate::index::{check_shape, FilterIndex, SlotId};
use std::collections::HashSet;

/// Number of stored byte values per position (1..=255; zero is skipped).
const BLOCK_SIZE: usize = 255;

/// Index over per-(byte position, byte value) slot bitmaps.
///
/// # Examples
///
/// ```
/// use bloomdex::index::{BlockedSetIndex, FilterIndex};
/// use bloomdex::hash::hasher_for;
/// use bloomdex::{Filter, Shape};
///
/// let shape = Shape::new(bloomdex::hash::XXH3_EDH, 64, 3).unwrap();
/// let mut index = BlockedSetIndex::new(shape.clone());
/// let filter = Filter::from_hasher(&hasher_for("Hello World"), &shape).unwrap();
///
/// let slot = index.put(&filter).unwrap();
/// assert_eq!(index.get(&filter).unwrap(), Some(slot));
/// ```
#[derive(Debug)]
pub struct BlockedSetIndex {
    shape: Shape,
    /// One lazily-allocated block per byte position; value `v` lives at
    /// `block[v - 1]`.
    blocks: Vec<Option<Box<[Option<BitVec>]>>>,
    slots: SlotAllocator,
}

impl BlockedSetIndex {
    /// Create an empty index for filters of `shape`.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        let blocks = vec![None; shape.byte_count()];
        Self {
            shape,
            blocks,
            slots: SlotAllocator::new(),
        }
    }

    fn empty_block() -> Box<[Option<BitVec>]> {
        vec![None; BLOCK_SIZE].into_boxed_slice()
    }

    /// Union of the superset-value vectors at one position, or `None` when
    /// no stored slot can match the query byte there.
    fn position_union(block: &[Option<BitVec>], value: u8) -> Option<BitVec> {
        let mut union: Option<BitVec> = None;
        for &sv in byte_supersets(value) {
            if let Some(bv) = &block[sv as usize - 1] {
                match &mut union {
                    Some(u) => u.or(bv),
                    None => union = Some(bv.clone()),
                }
            }
        }
        union
    }

    fn collect(answer: &BitVec) -> HashSet<SlotId> {
        answer.iter_set_bits().map(SlotId::new).collect()
    }
}

impl FilterIndex for BlockedSetIndex {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn get(&self, query: &Filter) -> Result<Option<SlotId>> {
        check_shape(&self.shape, query)?;
        let mut answer = self.slots.busy().clone();
        for (pos, block) in self.blocks.iter().enumerate() {
            let value = query.byte_at(pos);
            if value != 0 {
                // The exact value vector, not the superset expansion.
                let Some(bv) = block
                    .as_ref()
                    .and_then(|b| b[value as usize - 1].as_ref())
                else {
                    return Ok(None);
                };
                answer.and(bv);
            } else if let Some(block) = block {
                // A zero query byte excludes every slot with a non-zero
                // byte at this position.
                for bv in block.iter().flatten() {
                    answer.and_not(bv);
                }
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
        for pos in 0..self.shape.byte_count() {
            let value = filter.byte_at(pos);
            if value == 0 {
                continue;
            }
            let block = self.blocks[pos].get_or_insert_with(Self::empty_block);
            let bv = block[value as usize - 1].get_or_insert_with(BitVec::new);
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
        for block_entry in &mut self.blocks {
            let Some(block) = block_entry else { continue };
            let mut block_empty = true;
            for value_entry in block.iter_mut() {
                if let Some(bv) = value_entry {
                    if idx < bv.len() {
                        bv.unset(idx);
                    }
                    if bv.is_zero() {
                        *value_entry = None;
                    } else {
                        block_empty = false;
                    }
                }
            }
            if block_empty {
                *block_entry = None;
            }
        }
        self.slots.release(idx);
    }

    fn search(&self, query: &Filter) -> Result<HashSet<SlotId>> {
        check_shape(&self.shape, query)?;
        let mut answer: Option<BitVec> = None;
        for (pos, block) in self.blocks.iter().enumerate() {
            let value = query.byte_at(pos);
            if value == 0 {
                continue;
            }
            // No block, or no stored superset value, means nothing can match.
            let Some(union) = block.as_ref().and_then(|b| Self::position_union(b, value))
            else {
                return Ok(HashSet::new());
            };
            match &mut answer {
                Some(a) => {
                    a.and(&union);
                    if a.is_zero() {
                        return Ok(HashSet::new());
                    }
                }
                None => answer = Some(union),
            }
        }
        Ok(match answer {
            Some(a) => Self::collect(&a),
            // Every query byte was zero: the empty query matches all live
            // slots.
            None => self.get_all(),
        })
    }

    fn get_all(&self) -> HashSet<SlotId> {
        self.slots.iter_live().map(SlotId::new).collect()
    }

    fn filter_count(&self) -> usize {
        self.slots.live_count()
    }
}
