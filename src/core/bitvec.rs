//! Growable bit vector backing every index structure in the crate.
//!
//! # Overview
//!
//! `BitVec` is a dynamically-sized bit array backed by `Vec<u64>`. The logical
//! length is always a multiple of 64: constructors and [`BitVec::resize`]
//! round the requested bit count up to the next word boundary. Reading past
//! the declared length behaves as zero, which is what lets the index
//! structures treat vectors of different generations (allocated before and
//! after a slot-range extension) as interoperable.
//!
//! # Zero padding
//!
//! The boolean operations [`and`](BitVec::and), [`or`](BitVec::or) and
//! [`and_not`](BitVec::and_not) accept an operand of any length and treat the
//! shorter side as zero-padded:
//!
//! - `and` zeroes every word of `self` beyond the operand's length,
//! - `or` grows `self` if the operand is longer,
//! - `and_not` leaves words beyond the operand's length untouched.
//!
//! Callers that need strict length equality must [`resize`](BitVec::resize)
//! first.
//!
//! # Memory Layout
//!
//! Bits are packed into 64-bit words in little-endian bit order:
//!
//! ```text
//! Word 0: [bit 0][bit 1]...[bit 63]
//! Word 1: [bit 64][bit 65]...[bit 127]
//! ```
//!
//! # Thread Safety
//!
//! None. A `BitVec` is exclusively owned by its index or container and all
//! mutation happens in place; concurrent access requires external locking.
//!
//! # Examples
//!
//! ```
//! use bloomdex::core::BitVec;
//!
//! let mut bv = BitVec::with_bits(100);
//! bv.set(42);
//! assert!(bv.get(42));
//! assert!(!bv.get(43));
//! assert_eq!(bv.cardinality(), 1);
//! assert_eq!(bv.len(), 128); // rounded up to a word boundary
//! ```

use std::fmt;

const WORD_BITS: usize = u64::BITS as usize;

/// Growable bit vector over 64-bit words.
///
/// Equality is bitwise and insensitive to trailing zero words: two vectors of
/// different lengths compare equal when every set bit agrees.
#[derive(Clone, Default)]
pub struct BitVec {
    /// Backing words; logical length is `words.len() * 64`.
    words: Vec<u64>,
}

impl BitVec {
    /// Create an empty bit vector (zero bits, zero words).
    #[must_use]
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Create a bit vector with at least `bits` bits, all zero.
    ///
    /// The length is rounded up to the next multiple of 64.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomdex::core::BitVec;
    ///
    /// let bv = BitVec::with_bits(65);
    /// assert_eq!(bv.len(), 128);
    /// assert_eq!(bv.cardinality(), 0);
    /// ```
    #[must_use]
    pub fn with_bits(bits: usize) -> Self {
        Self {
            words: vec![0u64; bits.div_ceil(WORD_BITS)],
        }
    }

    /// Create a bit vector from raw words.
    #[must_use]
    pub fn from_words(words: Vec<u64>) -> Self {
        Self { words }
    }

    /// Declared length in bits (always a multiple of 64).
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    /// `true` when the vector holds no words at all.
    ///
    /// A vector can be non-empty and still have no set bits; see
    /// [`is_zero`](Self::is_zero) for that test.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// `true` when no bit is set.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of backing words.
    #[must_use]
    #[inline]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Backing words as a slice.
    #[must_use]
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Word at `idx`, or zero past the declared length.
    #[must_use]
    #[inline]
    pub fn word(&self, idx: usize) -> u64 {
        self.words.get(idx).copied().unwrap_or(0)
    }

    /// Read the bit at `index`.
    ///
    /// Reading past the declared length returns `false` rather than
    /// panicking; unallocated tail bits are zero by definition.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        match self.words.get(index / WORD_BITS) {
            Some(word) => word & (1u64 << (index % WORD_BITS)) != 0,
            None => false,
        }
    }

    /// Set the bit at `index` to 1.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`. Writes, unlike reads, never extend the
    /// vector implicitly; callers resize first.
    #[inline]
    pub fn set(&mut self, index: usize) {
        assert!(
            index < self.len(),
            "BitVec index out of bounds: index={} len={}",
            index,
            self.len()
        );
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Set the bit at `index` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn set_value(&mut self, index: usize, value: bool) {
        if value {
            self.set(index);
        } else {
            self.unset(index);
        }
    }

    /// Clear the bit at `index` to 0.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn unset(&mut self, index: usize) {
        assert!(
            index < self.len(),
            "BitVec index out of bounds: index={} len={}",
            index,
            self.len()
        );
        self.words[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
    }

    /// Reset all bits to zero, keeping the current length.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Resize to at least `bits` bits, rounding up to a word boundary.
    ///
    /// Growth zero-fills; shrinking truncates whole words and discards their
    /// bits. This is the only operation that changes the declared length.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomdex::core::BitVec;
    ///
    /// let mut bv = BitVec::with_bits(64);
    /// bv.set(10);
    /// bv.resize(192);
    /// assert!(bv.get(10));
    /// assert!(!bv.get(130));
    /// ```
    pub fn resize(&mut self, bits: usize) {
        self.words.resize(bits.div_ceil(WORD_BITS), 0);
    }

    /// Count the bits set to 1.
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Index of the first set bit at or after `from`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomdex::core::BitVec;
    ///
    /// let mut bv = BitVec::with_bits(128);
    /// bv.set(70);
    /// assert_eq!(bv.next_set_bit(0), Some(70));
    /// assert_eq!(bv.next_set_bit(71), None);
    /// ```
    #[must_use]
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        let mut word_idx = from / WORD_BITS;
        if word_idx >= self.words.len() {
            return None;
        }
        let w = self.words[word_idx] >> (from % WORD_BITS);
        if w != 0 {
            return Some(from + w.trailing_zeros() as usize);
        }
        word_idx += 1;
        for (i, &word) in self.words.iter().enumerate().skip(word_idx) {
            if word != 0 {
                return Some(i * WORD_BITS + word.trailing_zeros() as usize);
            }
        }
        None
    }

    /// Index of the first unset bit at or after `from`, within the declared
    /// length.
    #[must_use]
    pub fn next_unset_bit(&self, from: usize) -> Option<usize> {
        let mut word_idx = from / WORD_BITS;
        if word_idx >= self.words.len() {
            return None;
        }
        let w = (!self.words[word_idx]) >> (from % WORD_BITS);
        if w != 0 {
            let candidate = from + w.trailing_zeros() as usize;
            return (candidate < self.len()).then_some(candidate);
        }
        word_idx += 1;
        for (i, &word) in self.words.iter().enumerate().skip(word_idx) {
            if word != u64::MAX {
                return Some(i * WORD_BITS + (!word).trailing_zeros() as usize);
            }
        }
        None
    }

    /// In-place intersection: `self &= other`.
    ///
    /// Words of `self` beyond `other`'s length are zeroed (the operand is
    /// zero there by definition).
    pub fn and(&mut self, other: &Self) {
        for (i, word) in self.words.iter_mut().enumerate() {
            *word &= other.word(i);
        }
    }

    /// In-place union: `self |= other`.
    ///
    /// Grows `self` if `other` is longer, so no set bit is lost.
    pub fn or(&mut self, other: &Self) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (i, word) in self.words.iter_mut().enumerate() {
            *word |= other.word(i);
        }
    }

    /// In-place difference: `self &= !other`.
    ///
    /// Words of `self` beyond `other`'s length are unchanged.
    pub fn and_not(&mut self, other: &Self) {
        let limit = self.words.len().min(other.words.len());
        for i in 0..limit {
            self.words[i] &= !other.words[i];
        }
    }

    /// Iterator over the indices of set bits, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomdex::core::BitVec;
    ///
    /// let mut bv = BitVec::with_bits(128);
    /// bv.set(3);
    /// bv.set(64);
    /// let bits: Vec<usize> = bv.iter_set_bits().collect();
    /// assert_eq!(bits, vec![3, 64]);
    /// ```
    pub fn iter_set_bits(&self) -> SetBits<'_> {
        SetBits { vec: self, next: 0 }
    }

    /// Words with trailing zero words trimmed; the canonical form used for
    /// equality and hashing.
    fn trimmed(&self) -> &[u64] {
        let mut end = self.words.len();
        while end > 0 && self.words[end - 1] == 0 {
            end -= 1;
        }
        &self.words[..end]
    }
}

impl PartialEq for BitVec {
    fn eq(&self, other: &Self) -> bool {
        self.trimmed() == other.trimmed()
    }
}

impl Eq for BitVec {}

impl std::hash::Hash for BitVec {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.trimmed().hash(state);
    }
}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitVec")
            .field("len", &self.len())
            .field("cardinality", &self.cardinality())
            .finish()
    }
}

/// Iterator over set-bit indices, produced by [`BitVec::iter_set_bits`].
pub struct SetBits<'a> {
    vec: &'a BitVec,
    next: usize,
}

impl Iterator for SetBits<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let found = self.vec.next_set_bit(self.next)?;
        self.next = found + 1;
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_bits_rounds_up() {
        let bv = BitVec::with_bits(100);
        assert_eq!(bv.len(), 128);
        assert_eq!(bv.word_count(), 2);
    }

    #[test]
    fn test_empty() {
        let bv = BitVec::new();
        assert_eq!(bv.len(), 0);
        assert!(bv.is_empty());
        assert!(bv.is_zero());
        assert!(!bv.get(0));
        assert_eq!(bv.next_set_bit(0), None);
    }

    #[test]
    fn test_set_get_unset() {
        let mut bv = BitVec::with_bits(128);
        bv.set(0);
        bv.set(63);
        bv.set(64);
        bv.set(127);

        assert!(bv.get(0));
        assert!(bv.get(63));
        assert!(bv.get(64));
        assert!(bv.get(127));
        assert!(!bv.get(32));

        bv.unset(63);
        assert!(!bv.get(63));
        assert_eq!(bv.cardinality(), 3);
    }

    #[test]
    fn test_get_past_length_is_zero() {
        let mut bv = BitVec::with_bits(64);
        bv.set(10);
        assert!(!bv.get(64));
        assert!(!bv.get(10_000));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_set_out_of_bounds_panics() {
        let mut bv = BitVec::with_bits(64);
        bv.set(64);
    }

    #[test]
    fn test_set_value() {
        let mut bv = BitVec::with_bits(64);
        bv.set_value(5, true);
        assert!(bv.get(5));
        bv.set_value(5, false);
        assert!(!bv.get(5));
    }

    #[test]
    fn test_clear() {
        let mut bv = BitVec::with_bits(128);
        bv.set(10);
        bv.set(100);
        bv.clear();
        assert_eq!(bv.cardinality(), 0);
        assert_eq!(bv.len(), 128);
    }

    #[test]
    fn test_resize_grow_preserves_and_zero_fills() {
        let mut bv = BitVec::with_bits(64);
        bv.set(10);
        bv.resize(256);
        assert_eq!(bv.len(), 256);
        assert!(bv.get(10));
        assert_eq!(bv.cardinality(), 1);
    }

    #[test]
    fn test_resize_shrink_truncates() {
        let mut bv = BitVec::with_bits(128);
        bv.set(100);
        bv.set(5);
        bv.resize(64);
        assert_eq!(bv.len(), 64);
        assert!(bv.get(5));
        assert_eq!(bv.cardinality(), 1);
    }

    #[test]
    fn test_next_set_bit() {
        let mut bv = BitVec::with_bits(256);
        bv.set(0);
        bv.set(63);
        bv.set(130);

        assert_eq!(bv.next_set_bit(0), Some(0));
        assert_eq!(bv.next_set_bit(1), Some(63));
        assert_eq!(bv.next_set_bit(64), Some(130));
        assert_eq!(bv.next_set_bit(131), None);
    }

    #[test]
    fn test_next_unset_bit() {
        let mut bv = BitVec::with_bits(128);
        for i in 0..64 {
            bv.set(i);
        }
        assert_eq!(bv.next_unset_bit(0), Some(64));
        bv.set(64);
        assert_eq!(bv.next_unset_bit(0), Some(65));
    }

    #[test]
    fn test_next_unset_bit_full_vector() {
        let mut bv = BitVec::with_bits(64);
        for i in 0..64 {
            bv.set(i);
        }
        assert_eq!(bv.next_unset_bit(0), None);
    }

    #[test]
    fn test_and_zero_pads_shorter_operand() {
        let mut a = BitVec::with_bits(128);
        a.set(10);
        a.set(100);
        let mut b = BitVec::with_bits(64);
        b.set(10);

        a.and(&b);
        assert!(a.get(10));
        assert!(!a.get(100)); // beyond b's length, treated as zero
    }

    #[test]
    fn test_or_grows_to_longer_operand() {
        let mut a = BitVec::with_bits(64);
        a.set(1);
        let mut b = BitVec::with_bits(192);
        b.set(150);

        a.or(&b);
        assert_eq!(a.len(), 192);
        assert!(a.get(1));
        assert!(a.get(150));
    }

    #[test]
    fn test_and_not() {
        let mut a = BitVec::with_bits(128);
        a.set(10);
        a.set(20);
        a.set(100);
        let mut b = BitVec::with_bits(64);
        b.set(20);

        a.and_not(&b);
        assert!(a.get(10));
        assert!(!a.get(20));
        assert!(a.get(100)); // beyond b's length, untouched
    }

    #[test]
    fn test_equality_ignores_trailing_zero_words() {
        let mut a = BitVec::with_bits(64);
        a.set(3);
        let mut b = BitVec::with_bits(256);
        b.set(3);
        assert_eq!(a, b);

        b.set(200);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut a = BitVec::with_bits(64);
        a.set(3);
        let mut b = BitVec::with_bits(192);
        b.set(3);

        let hash = |bv: &BitVec| {
            let mut h = DefaultHasher::new();
            bv.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_iter_set_bits() {
        let mut bv = BitVec::with_bits(256);
        bv.set(1);
        bv.set(64);
        bv.set(255);
        let collected: Vec<usize> = bv.iter_set_bits().collect();
        assert_eq!(collected, vec![1, 64, 255]);
    }

    #[test]
    fn test_word_access_past_end() {
        let bv = BitVec::with_bits(64);
        assert_eq!(bv.word(5), 0);
    }
}
