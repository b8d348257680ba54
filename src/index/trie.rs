//! Chunked n-ary trie index.
//!
//! The filter is cut into fixed-width chunks (4 or 8 bits) and each stored
//! filter becomes a root-to-leaf path whose edge at depth `d` is labeled by
//! the chunk value at position `d`. Search walks the trie depth-first,
//! expanding each query chunk into its superset values from the precomputed
//! table and following every existing child among them; the leaves reached
//! carry the matching slot ids.
//!
//! Nodes live in an arena and address each other by index, with a parent
//! back-link on every node: removal deletes a leaf and then walks up,
//! collapsing each inner node that became empty. The back-links are also how
//! exact lookup reconstructs a candidate's stored bit pattern for the final bitwise
//! comparison: the edge labels along the path *are* the filter.
//! comparison.
//!
//! Costs for width `w`: insert O(m/w); search O(1.5^w · m/w), since a chunk
//! expands to ~1.5^w superset values on average; memory O(2^w · m/w · N).

use crate::core::{BitVec, Filter, Shape};
use crate::error::Result;
use crate::index::slots::SlotAllocator;
use crate::index::tables::{byte_supersets, nibble_supersets};
use crate::index::{check_shape, FilterIndex, SlotId};
use std::collections::HashSet;

/// Chunk width of a [`ChunkedTrie`].
///
/// Width 4 gives a fanout of 16 with a 5-deep tree per 20 bits; width 8
/// trades a 256-way fanout for half the depth and a wider search expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkWidth {
    /// 4-bit chunks, fanout 16.
    Four,
    /// 8-bit chunks, fanout 256.
    Eight,
}

impl ChunkWidth {
    /// Chunk width in bits.
    #[must_use]
    pub fn bits(self) -> usize {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// Branching factor, `2^bits`.
    #[must_use]
    pub fn fanout(self) -> usize {
        1 << self.bits()
    }

    fn supersets(self, value: u8) -> &'static [u8] {
        match self {
            Self::Four => nibble_supersets(value),
            Self::Eight => byte_supersets(value),
        }
    }
}

/// Arena node: either an inner dispatch table or a leaf holding a slot.
#[derive(Debug)]
struct Node {
    /// Arena index of the parent; `None` only for the root.
    parent: Option<usize>,
    /// Chunk value labeling the edge from the parent to this node.
    edge: u8,
    kind: NodeKind,
}

#[derive(Debug)]
enum NodeKind {
    Inner {
        /// One entry per possible chunk value.
        children: Vec<Option<usize>>,
        /// Number of `Some` entries; drives cascading collapse.
        live: usize,
    },
    Leaf {
        slot: usize,
    },
}

impl Node {
    fn inner(fanout: usize, parent: Option<usize>, edge: u8) -> Self {
        Self {
            parent,
            edge,
            kind: NodeKind::Inner {
                children: vec![None; fanout],
                live: 0,
            },
        }
    }

    fn leaf(parent: usize, edge: u8, slot: usize) -> Self {
        Self {
            parent: Some(parent),
            edge,
            kind: NodeKind::Leaf { slot },
        }
    }
}

/// Trie index over chunked filters.
///
/// # Examples
///
/// ```
/// use bloomdex::index::{ChunkWidth, ChunkedTrie, FilterIndex};
/// use bloomdex::hash::hasher_for;
/// use bloomdex::{Filter, Shape};
///
/// let shape = Shape::new(bloomdex::hash::XXH3_EDH, 64, 3).unwrap();
/// let mut index = ChunkedTrie::new(shape.clone(), ChunkWidth::Four);
/// let filter = Filter::from_hasher(&hasher_for("Hello World"), &shape).unwrap();
///
/// let slot = index.put(&filter).unwrap();
/// assert_eq!(index.get(&filter).unwrap(), Some(slot));
/// ```
#[derive(Debug)]
pub struct ChunkedTrie {
    shape: Shape,
    width: ChunkWidth,
    /// `ceil(bits / width)`: the number of chunks on every root-to-leaf path.
    max_depth: usize,
    arena: Vec<Option<Node>>,
    free_nodes: Vec<usize>,
    root: usize,
    /// Slot index -> arena index of the slot's leaf.
    leaves: Vec<Option<usize>>,
    slots: SlotAllocator,
}

impl ChunkedTrie {
    /// Create an empty trie for filters of `shape` with the given chunk
    /// width.
    #[must_use]
    pub fn new(shape: Shape, width: ChunkWidth) -> Self {
        let max_depth = shape.bits().div_ceil(width.bits());
        let root_node = Node::inner(width.fanout(), None, 0);
        Self {
            shape,
            width,
            max_depth,
            arena: vec![Some(root_node)],
            free_nodes: Vec::new(),
            root: 0,
            leaves: Vec::new(),
            slots: SlotAllocator::new(),
        }
    }

    /// Chunk width of this trie.
    #[must_use]
    pub fn width(&self) -> ChunkWidth {
        self.width
    }

    fn node(&self, idx: usize) -> &Node {
        self.arena[idx].as_ref().expect("arena node freed while referenced")
    }

    fn alloc_node(&mut self, node: Node) -> usize {
        match self.free_nodes.pop() {
            Some(idx) => {
                self.arena[idx] = Some(node);
                idx
            }
            None => {
                self.arena.push(Some(node));
                self.arena.len() - 1
            }
        }
    }

    fn child_of(&self, idx: usize, chunk: usize) -> Option<usize> {
        match &self.node(idx).kind {
            NodeKind::Inner { children, .. } => children[chunk],
            NodeKind::Leaf { .. } => None,
        }
    }

    fn link_child(&mut self, idx: usize, chunk: usize, child: usize) {
        match &mut self.arena[idx].as_mut().expect("arena node freed while referenced").kind {
            NodeKind::Inner { children, live } => {
                debug_assert!(children[chunk].is_none());
                children[chunk] = Some(child);
                *live += 1;
            }
            NodeKind::Leaf { .. } => unreachable!("leaf nodes have no children"),
        }
    }

    /// Unlink `edge` from the inner node `idx`, returning the number of
    /// children left.
    fn unlink_child(&mut self, idx: usize, edge: u8) -> usize {
        match &mut self.arena[idx].as_mut().expect("arena node freed while referenced").kind {
            NodeKind::Inner { children, live } => {
                debug_assert!(children[edge as usize].is_some());
                children[edge as usize] = None;
                *live -= 1;
                *live
            }
            NodeKind::Leaf { .. } => unreachable!("leaf nodes have no children"),
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.arena[idx] = None;
        self.free_nodes.push(idx);
    }

    /// Depth-first superset walk from `idx` at `level`, collecting leaf
    /// slots.
    fn search_node(&self, idx: usize, level: usize, query: &Filter, out: &mut HashSet<SlotId>) {
        let query_chunk = query.chunk(level, self.width.bits());
        let last_level = level + 1 == self.max_depth;
        for &chunk in self.width.supersets(query_chunk) {
            let Some(child) = self.child_of(idx, chunk as usize) else {
                continue;
            };
            if last_level {
                match &self.node(child).kind {
                    NodeKind::Leaf { slot } => {
                        out.insert(SlotId::new(*slot));
                    }
                    NodeKind::Inner { .. } => unreachable!("inner node at leaf depth"),
                }
            } else {
                self.search_node(child, level + 1, query, out);
            }
        }
    }

    /// Rebuild the stored bit pattern of a leaf from the edge labels on its
    /// root path.
    fn reconstruct(&self, leaf_idx: usize) -> BitVec {
        let mut bits = BitVec::with_bits(self.shape.bits());
        let width = self.width.bits();
        let mut level = self.max_depth;
        let mut idx = leaf_idx;
        while let Some(parent) = self.node(idx).parent {
            level -= 1;
            let chunk = self.node(idx).edge;
            for j in 0..width {
                if chunk >> j & 1 != 0 {
                    bits.set(level * width + j);
                }
            }
            idx = parent;
        }
        debug_assert_eq!(level, 0);
        bits
    }
}

impl FilterIndex for ChunkedTrie {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn get(&self, query: &Filter) -> Result<Option<SlotId>> {
        let candidates = self.search(query)?;
        let mut found: Option<SlotId> = None;
        for candidate in candidates {
            let Some(leaf_idx) = self.leaves.get(candidate.index()).copied().flatten() else {
                continue;
            };
            if self.reconstruct(leaf_idx) == *query.bits() {
                assert!(
                    found.is_none(),
                    "duplicate filter stored at {} and {}: insert invariant broken",
                    found.unwrap(),
                    candidate
                );
                found = Some(candidate);
            }
        }
        Ok(found)
    }

    fn put(&mut self, filter: &Filter) -> Result<SlotId> {
        if let Some(existing) = self.get(filter)? {
            return Ok(existing);
        }
        let slot = self.slots.allocate();
        let width = self.width.bits();
        let mut cur = self.root;
        for level in 0..self.max_depth {
            let chunk = filter.chunk(level, width) as usize;
            cur = match self.child_of(cur, chunk) {
                Some(child) => child,
                None => {
                    let node = if level + 1 == self.max_depth {
                        Node::leaf(cur, chunk as u8, slot)
                    } else {
                        Node::inner(self.width.fanout(), Some(cur), chunk as u8)
                    };
                    let child = self.alloc_node(node);
                    self.link_child(cur, chunk, child);
                    child
                }
            };
        }
        if self.leaves.len() <= slot {
            self.leaves.resize(slot + 1, None);
        }
        self.leaves[slot] = Some(cur);
        Ok(SlotId::new(slot))
    }

    fn remove(&mut self, slot: SlotId) {
        let idx = slot.index();
        if !self.slots.is_live(idx) {
            return;
        }
        let Some(mut node) = self.leaves.get_mut(idx).and_then(Option::take) else {
            return;
        };
        // Delete the leaf, then collapse every ancestor left empty. The
        // root survives even when empty.
        loop {
            let parent = self.node(node).parent;
            let edge = self.node(node).edge;
            self.free_node(node);
            match parent {
                Some(p) => {
                    let remaining = self.unlink_child(p, edge);
                    if remaining > 0 || p == self.root {
                        break;
                    }
                    node = p;
                }
                None => break,
            }
        }
        self.slots.release(idx);
    }

    fn search(&self, query: &Filter) -> Result<HashSet<SlotId>> {
        check_shape(&self.shape, query)?;
        let mut out = HashSet::new();
        self.search_node(self.root, 0, query, &mut out);
        Ok(out)
    }

    fn get_all(&self) -> HashSet<SlotId> {
        self.slots.iter_live().map(SlotId::new).collect()
    }

    fn filter_count(&self) -> usize {
        self.slots.live_count()
    }
}
