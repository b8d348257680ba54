//! Core types shared by every index strategy and the container.
//!
//! ```text
//! core/
//! ├── bitvec.rs    - Growable bit vector
//! ├── shape.rs     - Shape value object and parameter math
//! ├── filter.rs    - Immutable Bloom filter
//! └── mod.rs       - This file (public API)
//! ```
//!
//! The dependency order is strictly leaves-first: `BitVec` knows nothing of
//! shapes, `Shape` knows nothing of filters, and `Filter` composes the two.

pub mod bitvec;
pub mod filter;
pub mod shape;

pub use bitvec::BitVec;
pub use filter::Filter;
pub use shape::Shape;
pub use shape::{MAX_HASH_FUNCTIONS, MIN_HASH_FUNCTIONS};
