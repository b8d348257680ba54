//! The immutable Bloom filter value.
//!
//! A [`Filter`] is a bit vector of exactly `shape.bits()` logical bits,
//! derived once from a hasher and never mutated afterwards. Equality is
//! bitwise; the superset relation ([`Filter::is_superset_of`]) is the
//! "contains" test every index strategy builds on.

use crate::core::{BitVec, Shape};
use crate::error::{BloomdexError, Result};
use crate::hash::BitHasher;

/// An immutable Bloom filter built under a [`Shape`].
///
/// # Examples
///
/// ```
/// use bloomdex::{Filter, Shape};
/// use bloomdex::hash::hasher_for;
///
/// let shape = Shape::new("xxh3-128-edh", 64, 3).unwrap();
/// let filter = Filter::from_hasher(&hasher_for("Hello World"), &shape).unwrap();
/// assert!(filter.cardinality() <= 3);
/// assert!(filter.is_superset_of(&filter));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filter {
    shape: Shape,
    bits: BitVec,
}

impl Filter {
    /// Build a filter by enabling every bit index the hasher produces for
    /// `shape`.
    ///
    /// Duplicate indices are permitted and collapse into one set bit; the
    /// produced order is irrelevant.
    ///
    /// # Errors
    ///
    /// - [`BloomdexError::ShapeMismatch`] if the hasher's identity differs
    ///   from the shape's
    /// - [`BloomdexError::IndexOutOfBounds`] if any produced index is
    ///   `>= shape.bits()`
    pub fn from_hasher<H: BitHasher + ?Sized>(hasher: &H, shape: &Shape) -> Result<Self> {
        if hasher.identity() != shape.hash_identity() {
            return Err(BloomdexError::shape_mismatch(format!(
                "hasher identity '{}' does not match shape identity '{}'",
                hasher.identity(),
                shape.hash_identity()
            )));
        }
        let mut bits = BitVec::with_bits(shape.bits());
        for index in hasher.indices(shape) {
            if index >= shape.bits() {
                return Err(BloomdexError::index_out_of_bounds(index, shape.bits()));
            }
            bits.set(index);
        }
        Ok(Self {
            shape: shape.clone(),
            bits,
        })
    }

    /// Reconstruct a filter from an existing bit pattern.
    ///
    /// # Errors
    ///
    /// [`BloomdexError::IndexOutOfBounds`] if the vector has a set bit at or
    /// beyond `shape.bits()`.
    pub fn from_bits(mut bits: BitVec, shape: &Shape) -> Result<Self> {
        if let Some(stray) = bits.next_set_bit(shape.bits()) {
            return Err(BloomdexError::index_out_of_bounds(stray, shape.bits()));
        }
        bits.resize(shape.bits());
        Ok(Self {
            shape: shape.clone(),
            bits,
        })
    }

    /// The shape this filter was built under.
    #[must_use]
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The underlying bit vector.
    #[must_use]
    #[inline]
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    /// Backing words of the bit vector.
    #[must_use]
    #[inline]
    pub fn words(&self) -> &[u64] {
        self.bits.words()
    }

    /// Read one bit.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index)
    }

    /// Number of set bits.
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.bits.cardinality()
    }

    /// `true` when no bit is set (the empty query, which matches every
    /// stored filter on a superset search).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    /// Superset test: every bit set in `other` is also set in `self`.
    ///
    /// Both filters must have been built under the same shape; index and
    /// container entry points enforce that before calling.
    #[must_use]
    pub fn is_superset_of(&self, other: &Self) -> bool {
        let words = self.bits.words();
        other
            .bits
            .words()
            .iter()
            .enumerate()
            .all(|(i, &w)| w & !words.get(i).copied().unwrap_or(0) == 0)
    }

    /// Iterator over the set bit indices, ascending.
    pub fn iter_set_bits(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_set_bits()
    }

    /// The byte at byte-position `pos` (little-endian within each word).
    ///
    /// Positions at or beyond the shape's byte count read as zero.
    #[must_use]
    pub fn byte_at(&self, pos: usize) -> u8 {
        let word = self.bits.word(pos / 8);
        ((word >> ((pos % 8) * 8)) & 0xFF) as u8
    }

    /// The `width`-bit chunk at depth `level`.
    ///
    /// `width` must divide 64 so chunks never straddle a word boundary;
    /// the trie uses widths 4 and 8. Levels past the end read as zero.
    #[must_use]
    pub fn chunk(&self, level: usize, width: usize) -> u8 {
        debug_assert!(64 % width == 0, "chunk width must divide 64");
        let bit_offset = level * width;
        let word = self.bits.word(bit_offset / 64);
        let mask = (1u64 << width) - 1;
        ((word >> (bit_offset % 64)) & mask) as u8
    }
}
