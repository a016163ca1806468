//! # Treasure Hunt
//!
//! Round-based treasure hunt on a 10×10 grid. Players stake a fixed fee to
//! join a round and move one cell at a time; the first to reach the hidden
//! treasure takes 90% of the pool and the rest seeds the next round.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TREASURE HUNT                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Pure primitives                           │
//! │  ├── grid.rs     - Cells, directions, adjacency              │
//! │  ├── prime.rs    - Compile-time primality table              │
//! │  └── hash.rs     - Domain-separated SHA-256                  │
//! │                                                              │
//! │  game/           - Game logic                                │
//! │  ├── state.rs    - Round and player records                  │
//! │  ├── events.rs   - Emitted notifications                     │
//! │  ├── randomness.rs - Single in-flight request protocol       │
//! │  ├── engine.rs   - Round lifecycle and pool accounting       │
//! │  └── hunt.rs     - Facade over engine and collaborators      │
//! │                                                              │
//! │  oracle.rs       - Randomness oracle trait + local oracle    │
//! │  ledger.rs       - Value-transfer trait + in-memory ledger   │
//! │  clock.rs        - Time source                               │
//! │  config.rs       - Fee and round duration                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//!
//! Operations are all-or-nothing. Validation and collaborator calls happen
//! before any record changes, and events are only published once the
//! operation has succeeded.
//!
//! ## Example
//!
//! ```
//! use treasure_hunt::{GameConfig, InMemoryLedger, LocalOracle, SystemClock, TreasureHunt};
//!
//! let mut game = TreasureHunt::new(
//!     GameConfig::default(),
//!     LocalOracle::new(42),
//!     InMemoryLedger::new(),
//!     SystemClock,
//! )
//! .unwrap();
//!
//! // Round 1 waits for its treasure cell.
//! let seed = game.oracle_mut().fulfill_next().unwrap();
//! game.on_fulfillment(seed.handle, &seed.random_words).unwrap();
//! assert!(game.pending_request().is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod oracle;
pub mod ledger;
pub mod clock;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use core::grid::{Cell, Direction, GRID_CELLS, GRID_SIDE};
pub use game::{ActionResult, GameEvent, GameSnapshot, MoveOutcome, PlayerId, TreasureHunt};
pub use oracle::{LocalOracle, RandomnessOracle, RequestHandle};
pub use ledger::{InMemoryLedger, Ledger};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GameConfig;
pub use error::{ErrorKind, GameError, GameResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
