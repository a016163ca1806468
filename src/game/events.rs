//! Game Events
//!
//! Notifications emitted by successful operations, in emission order.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::core::grid::Cell;
use crate::game::randomness::RelocationRule;
use crate::game::state::{Amount, PlayerId, RoundIndex};
use crate::oracle::RequestHandle;

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventData {
    /// Player paid the fee and joined.
    PlayerJoined {
        player_id: PlayerId,
        fee: Amount,
    },

    /// Player's position was committed.
    PlayerRelocated {
        player_id: PlayerId,
        from: Cell,
        to: Cell,
    },

    /// Treasure moved (including initial seeding).
    TreasureRelocated {
        from: Option<Cell>,
        to: Cell,
        rule: Option<RelocationRule>,
    },

    /// A player reached the treasure.
    WinnerDeclared {
        player_id: PlayerId,
        payout: Amount,
    },

    /// Round closed, with or without a winner.
    RoundEnded {
        winner_id: Option<PlayerId>,
        carried_forward: Amount,
    },

    /// A new round opened.
    RoundBegun {
        seed_pool: Amount,
    },

    /// Stake returned from a past round.
    FundsWithdrawn {
        player_id: PlayerId,
        amount: Amount,
    },

    /// Randomness requested from the oracle.
    RandomnessRequested {
        handle: RequestHandle,
    },

    /// Randomness delivered and applied.
    RandomnessFulfilled {
        handle: RequestHandle,
    },
}

/// A game event with timing and round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// When the event occurred
    pub at: DateTime<Utc>,

    /// Round the event refers to
    pub round: RoundIndex,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(at: DateTime<Utc>, round: RoundIndex, data: GameEventData) -> Self {
        Self { at, round, data }
    }

    /// Player involved, if any.
    pub fn player_id(&self) -> Option<PlayerId> {
        match &self.data {
            GameEventData::PlayerJoined { player_id, .. }
            | GameEventData::PlayerRelocated { player_id, .. }
            | GameEventData::WinnerDeclared { player_id, .. }
            | GameEventData::FundsWithdrawn { player_id, .. } => Some(*player_id),
            GameEventData::RoundEnded { winner_id, .. } => *winner_id,
            _ => None,
        }
    }

    /// Short name, used in logs.
    pub fn name(&self) -> &'static str {
        match &self.data {
            GameEventData::PlayerJoined { .. } => "player_joined",
            GameEventData::PlayerRelocated { .. } => "player_relocated",
            GameEventData::TreasureRelocated { .. } => "treasure_relocated",
            GameEventData::WinnerDeclared { .. } => "winner_declared",
            GameEventData::RoundEnded { .. } => "round_ended",
            GameEventData::RoundBegun { .. } => "round_begun",
            GameEventData::FundsWithdrawn { .. } => "funds_withdrawn",
            GameEventData::RandomnessRequested { .. } => "randomness_requested",
            GameEventData::RandomnessFulfilled { .. } => "randomness_fulfilled",
        }
    }
}

/// Events collected during one operation.
///
/// Discarded if the operation fails, so observers never see partial effects.
#[derive(Debug)]
pub struct EventBuffer {
    at: DateTime<Utc>,
    events: Vec<GameEvent>,
}

impl EventBuffer {
    /// Start a buffer stamped with the operation's time.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at, events: Vec::new() }
    }

    /// Operation timestamp.
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Record an event.
    pub fn push(&mut self, round: RoundIndex, data: GameEventData) {
        self.events.push(GameEvent::new(self.at, round, data));
    }

    /// Consume into the recorded events.
    pub fn into_events(self) -> Vec<GameEvent> {
        self.events
    }
}
