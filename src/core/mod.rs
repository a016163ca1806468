//! Core deterministic primitives.
//!
//! Pure functions and value types with no game state.

pub mod grid;
pub mod prime;
pub mod hash;

// Re-export core types
pub use grid::{Cell, Direction, GridError, GRID_SIDE, GRID_CELLS};
pub use prime::is_prime;
pub use hash::{FieldHasher, Hash32};
