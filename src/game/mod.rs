//! Game Logic Module
//!
//! Everything stateful about the treasure hunt.
//!
//! ## Module Structure
//!
//! - `state`: Round and player records
//! - `events`: Notifications emitted by successful operations
//! - `randomness`: Single in-flight randomness request and treasure relocation
//! - `engine`: Round lifecycle, moves, payouts, withdrawals
//! - `hunt`: Facade wiring the engine to its collaborators

pub mod state;
pub mod events;
pub mod randomness;
pub mod engine;
pub mod hunt;

// Re-export key types
pub use state::{Amount, PlayerId, PlayerRecord, Round, RoundIndex, RoundPhase};
pub use events::{GameEvent, GameEventData};
pub use randomness::{FulfillmentOutcome, PendingRequest, RandomnessContext, RelocationRule};
pub use engine::MoveOutcome;
pub use hunt::{ActionResult, GameSnapshot, TreasureHunt};
