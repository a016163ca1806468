//! Game State Definitions
//!
//! Round and player records. Uses BTreeMap-friendly keys for deterministic
//! iteration order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::core::grid::Cell;
use crate::core::hash::{FieldHasher, Hash32};

/// Value in the ledger's smallest unit.
pub type Amount = u64;

/// Monotonic round number, starting at 1.
pub type RoundIndex = u64;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Unique player identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create a fresh random id.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Short hex prefix for logs.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short())
    }
}

// =============================================================================
// ROUND
// =============================================================================

/// Lifecycle state of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Accepting joins and moves.
    Open,
    /// A randomness request is outstanding; moves are rejected.
    AwaitingRandomness,
    /// Terminal. Won or expired.
    Ended,
}

/// One play session with its own treasure, players and pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Round number.
    pub index: RoundIndex,

    /// Cell a player must occupy to win.
    pub treasure: Cell,

    /// Treasure is being relocated (request outstanding).
    pub relocating: bool,

    /// When the round was opened.
    pub started_at: DateTime<Utc>,

    /// Winner, once declared.
    pub winner: Option<PlayerId>,

    /// Accumulated pool value.
    pub pool: Amount,

    /// Players holding an active record for this round.
    pub active_players: u32,

    /// When the round ended (won or expired).
    pub ended_at: Option<DateTime<Utc>>,
}

impl Round {
    /// Open a new round seeded with `pool`.
    ///
    /// The treasure cell is a placeholder until the seed request resolves.
    pub fn new(index: RoundIndex, pool: Amount, started_at: DateTime<Utc>) -> Self {
        Self {
            index,
            treasure: Cell::ORIGIN,
            relocating: false,
            started_at,
            winner: None,
            pool,
            active_players: 0,
            ended_at: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RoundPhase {
        if self.ended_at.is_some() {
            RoundPhase::Ended
        } else if self.relocating {
            RoundPhase::AwaitingRandomness
        } else {
            RoundPhase::Open
        }
    }

    /// Has the round ended?
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Audit hash over every field of the record.
    pub fn compute_hash(&self) -> Hash32 {
        let mut hasher = FieldHasher::for_round();
        hasher.update_u64(self.index);
        hasher.update_u8(self.treasure.index());
        hasher.update_bool(self.relocating);
        hasher.update_i64(self.started_at.timestamp_millis());
        hasher.update_opt_id(self.winner.as_ref().map(PlayerId::as_bytes));
        hasher.update_u64(self.pool);
        hasher.update_u32(self.active_players);
        hasher.update_i64(self.ended_at.map_or(-1, |t| t.timestamp_millis()));
        hasher.finalize()
    }
}

// =============================================================================
// PLAYER RECORD
// =============================================================================

/// A player's participation in one round. Never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Round this record belongs to.
    pub round: RoundIndex,

    /// Player identity.
    pub player: PlayerId,

    /// Current cell.
    pub position: Cell,

    /// Cleared on withdrawal.
    pub active: bool,
}

impl PlayerRecord {
    /// Create an active record at the grid origin.
    pub fn new(round: RoundIndex, player: PlayerId) -> Self {
        Self {
            round,
            player,
            position: Cell::ORIGIN,
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_round_phase_transitions() {
        let mut round = Round::new(1, 0, t0());
        assert_eq!(round.phase(), RoundPhase::Open);

        round.relocating = true;
        assert_eq!(round.phase(), RoundPhase::AwaitingRandomness);

        round.ended_at = Some(t0());
        assert_eq!(round.phase(), RoundPhase::Ended);
    }

    #[test]
    fn test_round_hash_tracks_changes() {
        let round = Round::new(1, 100, t0());
        let mut other = round.clone();
        assert_eq!(round.compute_hash(), other.compute_hash());

        other.winner = Some(PlayerId::new([1; 16]));
        assert_ne!(round.compute_hash(), other.compute_hash());
    }

    #[test]
    fn test_player_id_uuid_roundtrip() {
        let id = PlayerId::random();
        assert_eq!(PlayerId::from_uuid_str(&id.to_uuid_string()), Some(id));
        assert!(PlayerId::from_uuid_str("not-a-uuid").is_none());
        assert_eq!(PlayerId::new([0xab; 16]).short(), "abababab");
    }
}
