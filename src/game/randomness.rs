//! Randomness Protocol
//!
//! Keeps at most one randomness request in flight, remembers what triggered
//! it, and applies the oracle's answer when it arrives.
//!
//! ```text
//!   Settled ──request_randomness──▶ AwaitingRandomness
//!      ▲                                   │
//!      └──────── on_fulfillment ◀──────────┘
//! ```
//!
//! While a request is outstanding the treasure cell is unstable, so the
//! round rejects moves until the answer is applied.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::core::grid::{adjacent_cells, Cell};
use crate::error::{GameError, GameResult};
use crate::game::engine::RoundEngine;
use crate::game::events::{EventBuffer, GameEventData};
use crate::game::state::{Amount, PlayerId, Round, RoundIndex};
use crate::ledger::Ledger;
use crate::oracle::{RandomnessOracle, RandomnessRequest, RequestHandle, RequestPurpose};

/// How the treasure moves when a move triggers randomness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationRule {
    /// One of the treasure's grid neighbors (candidate was a non-prime multiple of 5).
    AdjacentMove,
    /// Anywhere on the grid (candidate was prime).
    FullReset,
}

/// What a pending request will do once answered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RandomnessContext {
    /// Relocate the treasure, then finish the player's move.
    ResolveMove {
        player: PlayerId,
        candidate: Cell,
        rule: RelocationRule,
    },
    /// Pick a fresh round's treasure cell.
    SeedNewRound,
}

impl RandomnessContext {
    fn purpose(&self) -> RequestPurpose {
        match self {
            RandomnessContext::ResolveMove { .. } => RequestPurpose::ResolveMove,
            RandomnessContext::SeedNewRound => RequestPurpose::SeedRound,
        }
    }
}

/// The single outstanding request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Oracle handle.
    pub handle: RequestHandle,
    /// Round the answer applies to.
    pub round: RoundIndex,
    /// What triggered the request.
    pub context: RandomnessContext,
    /// When it was issued.
    pub requested_at: DateTime<Utc>,
}

/// Result of applying a fulfillment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// A new round's treasure was placed.
    RoundSeeded {
        /// Round seeded
        round: RoundIndex,
        /// Treasure cell
        treasure: Cell,
    },
    /// Treasure moved and the player's move was committed.
    PlayerMoved {
        /// Mover
        player: PlayerId,
        /// Committed position
        position: Cell,
        /// Relocated treasure
        treasure: Cell,
    },
    /// Treasure moved onto the player's candidate cell.
    Won {
        /// Winner
        player: PlayerId,
        /// Amount paid
        payout: Amount,
        /// Final treasure cell
        treasure: Cell,
    },
}

/// Where the treasure goes for `rule`, given the oracle's `value`.
///
/// Adjacent moves index the stable neighbor order with `value mod count`.
pub fn relocate_treasure(current: Cell, rule: RelocationRule, value: u64) -> GameResult<Cell> {
    match rule {
        RelocationRule::FullReset => Ok(Cell::from_random(value)),
        RelocationRule::AdjacentMove => {
            let neighbors = adjacent_cells(current);
            if neighbors.is_empty() {
                return Err(GameError::NoAdjacentCell(current));
            }
            let selector = (value % neighbors.len() as u64) as usize;
            Ok(neighbors[selector])
        }
    }
}

/// Single-slot request tracker.
#[derive(Clone, Debug, Default)]
pub struct RandomnessProtocol {
    pending: Option<PendingRequest>,
}

impl RandomnessProtocol {
    /// Protocol with nothing outstanding.
    pub fn new() -> Self {
        Self::default()
    }

    /// The outstanding request, if any.
    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    /// No request outstanding.
    pub fn is_settled(&self) -> bool {
        self.pending.is_none()
    }

    /// Ask the oracle for randomness without touching game state.
    ///
    /// Split from [`record`](Self::record) so callers can run other fallible
    /// steps between submission and mutation.
    pub(crate) fn submit<O: RandomnessOracle>(
        &self,
        oracle: &mut O,
        round: RoundIndex,
        context: &RandomnessContext,
    ) -> GameResult<RequestHandle> {
        if let Some(pending) = &self.pending {
            return Err(GameError::RequestAlreadyPending(pending.round));
        }
        let request = RandomnessRequest::new(round, context.purpose());
        Ok(oracle.submit_request(&request)?)
    }

    /// Store a submitted request and mark its round as relocating.
    pub(crate) fn record(
        &mut self,
        handle: RequestHandle,
        round: &mut Round,
        context: RandomnessContext,
        events: &mut EventBuffer,
    ) {
        info!(
            "Randomness requested for round {} ({:?}), handle {}",
            round.index,
            context.purpose(),
            handle.short()
        );
        round.relocating = true;
        self.pending = Some(PendingRequest {
            handle,
            round: round.index,
            context,
            requested_at: events.at(),
        });
        events.push(round.index, GameEventData::RandomnessRequested { handle });
    }

    /// Submit and record in one step.
    pub fn request_randomness<O: RandomnessOracle>(
        &mut self,
        oracle: &mut O,
        round: &mut Round,
        context: RandomnessContext,
        events: &mut EventBuffer,
    ) -> GameResult<RequestHandle> {
        if round.relocating {
            return Err(GameError::RoundBusy(round.index));
        }
        let handle = self.submit(oracle, round.index, &context)?;
        self.record(handle, round, context, events);
        Ok(handle)
    }

    /// Apply the oracle's answer for `handle`.
    ///
    /// Fails with [`GameError::UnknownRequest`] and changes nothing unless
    /// `handle` matches the outstanding request. The slot is cleared before
    /// dispatch so a winning move can immediately request the next round's seed.
    pub fn on_fulfillment<O: RandomnessOracle, L: Ledger>(
        &mut self,
        engine: &mut RoundEngine,
        oracle: &mut O,
        ledger: &mut L,
        handle: RequestHandle,
        random_words: &[u64],
        events: &mut EventBuffer,
    ) -> GameResult<FulfillmentOutcome> {
        let pending = match &self.pending {
            Some(pending) if pending.handle == handle => pending.clone(),
            _ => {
                warn!("Rejected fulfillment for unknown request {}", handle.short());
                return Err(GameError::UnknownRequest(handle));
            }
        };
        let value = *random_words
            .first()
            .ok_or(GameError::MissingRandomWords(handle))?;

        let round_index = pending.round;
        let old_treasure = engine.round(round_index)?.treasure;

        // Everything fallible about the relocation happens before the slot is cleared.
        let (new_treasure, rule) = match &pending.context {
            RandomnessContext::SeedNewRound => (Cell::from_random(value), None),
            RandomnessContext::ResolveMove { rule, .. } => {
                (relocate_treasure(old_treasure, *rule, value)?, Some(*rule))
            }
        };

        {
            let round = engine.round_mut(round_index)?;
            round.relocating = false;
            round.treasure = new_treasure;
        }
        self.pending = None;
        events.push(
            round_index,
            GameEventData::TreasureRelocated {
                from: rule.map(|_| old_treasure),
                to: new_treasure,
                rule,
            },
        );

        let outcome = match pending.context.clone() {
            RandomnessContext::SeedNewRound => {
                info!("Round {} treasure seeded", round_index);
                Ok(FulfillmentOutcome::RoundSeeded {
                    round: round_index,
                    treasure: new_treasure,
                })
            }
            RandomnessContext::ResolveMove { player, candidate, .. } if candidate == new_treasure => {
                engine
                    .end_round_and_pay(player, self, oracle, ledger, events)
                    .map(|payout| FulfillmentOutcome::Won {
                        player,
                        payout,
                        treasure: new_treasure,
                    })
            }
            RandomnessContext::ResolveMove { player, candidate, .. } => {
                engine
                    .commit_position(round_index, player, candidate, events)
                    .map(|()| FulfillmentOutcome::PlayerMoved {
                        player,
                        position: candidate,
                        treasure: new_treasure,
                    })
            }
        };

        match outcome {
            Ok(outcome) => {
                debug!("Fulfilled request {}", handle.short());
                events.push(round_index, GameEventData::RandomnessFulfilled { handle });
                Ok(outcome)
            }
            Err(err) => {
                // Put the round back exactly as it was.
                if let Ok(round) = engine.round_mut(round_index) {
                    round.relocating = true;
                    round.treasure = old_treasure;
                }
                self.pending = Some(pending);
                Err(err)
            }
        }
    }
}
