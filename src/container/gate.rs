//! The counting-Bloom gate in front of the index.
//!
//! Every filter merged into the container is also superimposed onto the
//! gate: one counter per gate bit position, incremented for each hashed
//! position on insert and decremented on value removal. The gate is a pure
//! pre-filter: `passes == false` guarantees the index holds no match, while
//! `passes == true` says nothing and the index must be consulted.
//!
//! The gate has its *own* shape, sized from the estimated population rather
//! than the container's filter shape, so its saturation tracks the number of
//! stored values. Counters saturate instead of wrapping: an over-removal can
//! therefore weaken the gate's selectivity but can never introduce a false
//! negative.

use crate::core::Shape;
use crate::error::Result;
use crate::hash::BitHasher;

/// Counting Bloom filter used for fast rejection.
#[derive(Debug)]
pub struct CountingGate {
    shape: Shape,
    counters: Vec<u16>,
}

impl CountingGate {
    /// Create a gate sized for `estimated_population` items at the given
    /// false-positive probability, hashing under `hash_identity`.
    ///
    /// # Errors
    ///
    /// Propagates the shape-derivation errors of [`Shape::from_pop`].
    pub fn new(
        hash_identity: &str,
        estimated_population: usize,
        probability: f64,
    ) -> Result<Self> {
        let shape = Shape::from_pop(hash_identity, estimated_population, probability)?;
        let counters = vec![0u16; shape.bits()];
        Ok(Self { shape, counters })
    }

    /// The gate's own shape.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Superimpose one inserted value: increment each hashed counter.
    pub fn merge<H: BitHasher + ?Sized>(&mut self, hasher: &H) {
        for index in hasher.indices(&self.shape) {
            if let Some(counter) = self.counters.get_mut(index) {
                *counter = counter.saturating_add(1);
            }
        }
    }

    /// Subtract one removed value: decrement each hashed counter,
    /// saturating at zero.
    pub fn subtract<H: BitHasher + ?Sized>(&mut self, hasher: &H) {
        for index in hasher.indices(&self.shape) {
            if let Some(counter) = self.counters.get_mut(index) {
                *counter = counter.saturating_sub(1);
            }
        }
    }

    /// Conservative membership test: `false` guarantees no stored value
    /// hashes to these positions.
    ///
    /// A hasher producing no indices (the empty query) always passes: an
    /// empty superset query matches everything, so the gate must not reject
    /// it.
    #[must_use]
    pub fn passes<H: BitHasher + ?Sized>(&self, hasher: &H) -> bool {
        hasher
            .indices(&self.shape)
            .into_iter()
            .all(|index| self.counters.get(index).is_none_or(|&c| c > 0))
    }
}
