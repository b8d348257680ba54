//! Hash functions and hasher types feeding the filter layer.
//!
//! ```text
//! hash/
//! ├── hasher.rs      - BitHasher trait, DoubleHasher, FixedHasher
//! ├── collection.rs  - HasherCollection (multi-token values)
//! ├── caching.rs     - CachingHasher (precomputed expansion)
//! └── mod.rs         - This file (factories, public API)
//! ```
//!
//! The default pipeline hashes input bytes with xxh3-128, splits the digest
//! into two 64-bit halves, and expands them to `k` bit indices with enhanced
//! double hashing. Its identity token is [`XXH3_EDH`]; shapes built with a
//! different token will reject hashers from these factories.
//!
//! # Examples
//!
//! ```
//! use bloomdex::hash::{hasher_for, BitHasher, XXH3_EDH};
//! use bloomdex::Shape;
//!
//! let shape = Shape::new(XXH3_EDH, 1000, 7).unwrap();
//! let hasher = hasher_for("Hello World");
//! let indices = hasher.indices(&shape);
//! assert_eq!(indices.len(), 7);
//! ```

pub mod caching;
pub mod collection;
pub mod hasher;

pub use caching::CachingHasher;
pub use collection::HasherCollection;
pub use hasher::{BitHasher, DoubleHasher, FixedHasher};

use xxhash_rust::xxh3::xxh3_128;

/// Identity token of the default hash pipeline: xxh3-128 base hash expanded
/// by enhanced double hashing.
pub const XXH3_EDH: &str = "xxh3-128-edh";

/// Build the default hasher for a byte string.
#[must_use]
pub fn hasher_for_bytes(bytes: &[u8]) -> DoubleHasher {
    let digest = xxh3_128(bytes);
    DoubleHasher::new((digest >> 64) as u64, digest as u64)
}

/// Build the default hasher for a text value.
#[must_use]
pub fn hasher_for(text: &str) -> DoubleHasher {
    hasher_for_bytes(text.as_bytes())
}

/// Build a collection hashing each part independently, merging all their
/// indices into one filter.
///
/// This is how a multi-token value ("Hello World" indexed by "Hello" and by
/// "World") gets a filter that superset-matches a query on any single token.
#[must_use]
pub fn collection_for(parts: &[&str]) -> HasherCollection {
    let mut hashers = HasherCollection::new(XXH3_EDH);
    for part in parts {
        // hasher_for always carries XXH3_EDH, so add cannot fail
        hashers
            .add(hasher_for(part))
            .expect("factory hashers share the collection identity");
    }
    hashers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Shape;

    #[test]
    fn test_hasher_for_deterministic() {
        let shape = Shape::new(XXH3_EDH, 1000, 5).unwrap();
        let a = hasher_for("Hello World").indices(&shape);
        let b = hasher_for("Hello World").indices(&shape);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_inputs_differ() {
        let shape = Shape::new(XXH3_EDH, 100_000, 7).unwrap();
        let a = hasher_for("Hello World").indices(&shape);
        let b = hasher_for("Goodbye Cruel World").indices(&shape);
        assert_ne!(a, b);
    }

    #[test]
    fn test_collection_for_merges_parts() {
        let shape = Shape::new(XXH3_EDH, 1000, 3).unwrap();
        let merged = collection_for(&["Hello", "World"]).indices(&shape);
        let mut expected = hasher_for("Hello").indices(&shape);
        expected.extend(hasher_for("World").indices(&shape));
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_collection_for_empty_is_empty_query() {
        let shape = Shape::new(XXH3_EDH, 1000, 3).unwrap();
        assert!(collection_for(&[]).indices(&shape).is_empty());
    }
}
