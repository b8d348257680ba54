//! bloomdex: a multidimensional Bloom filter index.
//!
//! bloomdex indexes large populations of fixed-shape Bloom filters so that
//! values can be retrieved by **exact filter match** or by **superset
//! ("contains") search**: given a query filter, find every stored value
//! whose filter has at least the query's bits set. This locates records by a
//! set of hashed feature tokens without ever storing or comparing the
//! original features.
//!
//! # What you get
//!
//! - [`core`]: the [`BitVec`](core::BitVec) bit-vector primitive, the
//!   [`Shape`] value object and the immutable [`Filter`].
//! - [`index`]: four interchangeable index structures behind one
//!   [`FilterIndex`](index::FilterIndex) trait:
//!
//!   | Strategy | Insert | Search | Memory |
//!   |----------|--------|--------|--------|
//!   | [`Linear`](index::Linear) | O(N) | O(N) | filters as-is |
//!   | [`FlatBloofi`](index::FlatBloofi) | O(k) | O(pages × k) | O(m·N/64) words |
//!   | [`BlockedSetIndex`](index::BlockedSetIndex) | O(m/8) | byte-table driven | per-(pos,byte) bitmaps |
//!   | [`RangePacked`](index::RangePacked) | O(k) | O(k) vector ANDs | O(m·N) bits |
//!   | [`ChunkedTrie`](index::ChunkedTrie) | O(m/w) | O(1.5^w · m/w) | O(2^w · m/w · N) |
//!
//! - [`container`]: a [`Container`](container::Container) wiring an index,
//!   a value [`storage`] and a counting-Bloom gate for fast rejection.
//! - [`hash`]: the hasher boundary: xxh3-128 base hashing expanded with
//!   enhanced double hashing, hasher collections for multi-token values,
//!   and index caching.
//!
//! Bloom filter semantics are inherited throughout: a superset search may
//! return false positives, never false negatives.
//!
//! # Quick Start
//!
//! ```
//! use bloomdex::container::Container;
//! use bloomdex::hash::{collection_for, hasher_for, XXH3_EDH};
//! use bloomdex::index::FlatBloofi;
//! use bloomdex::storage::InMemoryStorage;
//! use bloomdex::Shape;
//!
//! // A shape good for ~1000 distinct filters at 1% false positives.
//! let shape = Shape::from_pop(XXH3_EDH, 1000, 0.01).unwrap();
//! let index = FlatBloofi::new(shape.clone());
//! let mut container =
//!     Container::new(shape, InMemoryStorage::new(), index).unwrap();
//!
//! // Index a sentence by its words so a search on any word matches.
//! container
//!     .put(&collection_for(&["Hello", "World"]), "Hello World")
//!     .unwrap();
//! container
//!     .put(&collection_for(&["Goodbye", "Cruel", "World"]), "Goodbye Cruel World")
//!     .unwrap();
//!
//! let matches: Vec<_> = container
//!     .search(&collection_for(&["World"]))
//!     .unwrap()
//!     .collect();
//! assert_eq!(matches.len(), 2);
//!
//! // Exact lookup needs the exact same token set.
//! assert_eq!(container.get(&hasher_for("Hello")).unwrap().count(), 0);
//! ```
//!
//! # Choosing an index
//!
//! All strategies produce identical logical results; pick by workload.
//! `FlatBloofi` is the balanced default. `RangePacked` is the simplest and
//! fastest for small `m`; `BlockedSetIndex` trades insert cost for strong
//! search pruning on sparse filters; the trie pays memory for early search
//! cutoff on clustered populations; `Linear` is the baseline the rest are
//! verified against.
//!
//! # Concurrency
//!
//! The crate is single-threaded by contract: no internal locking anywhere.
//! Wrap a container in your own mutual exclusion if it must be shared.

pub mod container;
pub mod core;
pub mod error;
pub mod hash;
pub mod index;
pub mod storage;

pub use container::Container;
pub use core::{BitVec, Filter, Shape};
pub use error::{BloomdexError, Result};
pub use index::{FilterIndex, SlotId};
pub use storage::{InMemoryStorage, Storage};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{collection_for, hasher_for, XXH3_EDH};
    use crate::index::{BlockedSetIndex, ChunkWidth, ChunkedTrie, FlatBloofi, Linear, RangePacked};

    fn shape() -> Shape {
        Shape::from_pop(XXH3_EDH, 1000, 0.01).unwrap()
    }

    #[test]
    fn test_reexports_compose() {
        let shape = shape();
        let index = FlatBloofi::new(shape.clone());
        let mut container: Container<String, InMemoryStorage<String>, _> =
            Container::new(shape, InMemoryStorage::new(), index).unwrap();
        container
            .put(&hasher_for("alice"), "alice".to_string())
            .unwrap();
        assert_eq!(container.value_count(), 1);
    }

    #[test]
    fn test_every_strategy_serves_a_container() {
        let shape = shape();
        let indexes: Vec<Box<dyn FilterIndex>> = vec![
            Box::new(Linear::new(shape.clone())),
            Box::new(FlatBloofi::new(shape.clone())),
            Box::new(BlockedSetIndex::new(shape.clone())),
            Box::new(RangePacked::new(shape.clone())),
            Box::new(ChunkedTrie::new(shape.clone(), ChunkWidth::Four)),
            Box::new(ChunkedTrie::new(shape.clone(), ChunkWidth::Eight)),
        ];
        for index in indexes {
            let mut container =
                Container::new(shape.clone(), InMemoryStorage::new(), index).unwrap();
            container
                .put(&collection_for(&["Hello", "World"]), "Hello World")
                .unwrap();
            let hits: Vec<_> = container
                .search(&collection_for(&["World"]))
                .unwrap()
                .collect();
            assert_eq!(hits, vec![&"Hello World"]);
        }
    }
}
