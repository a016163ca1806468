//! Round Engine
//!
//! Owns round and player records, enforces the round lifecycle, pays
//! winners and rolls the pool into the next round.
//!
//! ```text
//!   Open ──move hits prime / multiple of 5──▶ AwaitingRandomness
//!    │  ▲                                            │
//!    │  └────────────── fulfillment ◀────────────────┘
//!    │                       │
//!    └── win / expire ──▶ Ended ──▶ next round Open (awaiting seed)
//! ```
//!
//! Every operation validates and performs its fallible collaborator calls
//! before it mutates a record. The oracle submission always precedes the
//! ledger transfer, so a failed transfer can only orphan a request.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::core::grid::{step, Cell, Direction};
use crate::core::prime::is_prime;
use crate::error::{GameError, GameResult};
use crate::game::events::{EventBuffer, GameEventData};
use crate::game::randomness::{RandomnessContext, RandomnessProtocol, RelocationRule};
use crate::game::state::{Amount, PlayerId, PlayerRecord, Round, RoundIndex};
use crate::ledger::Ledger;
use crate::oracle::{RandomnessOracle, RequestHandle};

/// Winner's share of the pool: 9/10, rounded down.
pub const PAYOUT_NUMERATOR: u128 = 9;
/// See [`PAYOUT_NUMERATOR`].
pub const PAYOUT_DENOMINATOR: u128 = 10;

/// Winner's payout for a pool: `floor(pool * 9 / 10)`.
#[inline]
pub fn payout_for(pool: Amount) -> Amount {
    (pool as u128 * PAYOUT_NUMERATOR / PAYOUT_DENOMINATOR) as Amount
}

/// Which relocation rule a candidate cell triggers, if any.
///
/// Primes are checked first, so 5 is a full reset rather than an adjacent move.
pub fn relocation_rule_for(candidate: Cell) -> GameResult<Option<RelocationRule>> {
    let index = candidate.index() as u64;
    if is_prime(index)? {
        Ok(Some(RelocationRule::FullReset))
    } else if index % 5 == 0 {
        Ok(Some(RelocationRule::AdjacentMove))
    } else {
        Ok(None)
    }
}

/// Result of a move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Position committed; round continues.
    Moved {
        /// New position
        to: Cell,
    },
    /// Treasure relocation requested; move completes on fulfillment.
    AwaitingRandomness {
        /// Cell the player will move to
        candidate: Cell,
        /// Relocation rule applied on fulfillment
        rule: RelocationRule,
        /// Pending request
        handle: RequestHandle,
    },
    /// Player won the round.
    Won {
        /// Amount paid
        payout: Amount,
    },
}

/// Round and player storage plus lifecycle rules.
#[derive(Clone, Debug)]
pub struct RoundEngine {
    config: GameConfig,
    current: RoundIndex,
    rounds: BTreeMap<RoundIndex, Round>,
    players: BTreeMap<(RoundIndex, PlayerId), PlayerRecord>,
}

impl RoundEngine {
    /// Create the engine with round 1 open and seeded with `initial_pool`.
    pub fn new(config: GameConfig, initial_pool: Amount, started_at: DateTime<Utc>) -> Self {
        let mut rounds = BTreeMap::new();
        rounds.insert(1, Round::new(1, initial_pool, started_at));
        Self {
            config,
            current: 1,
            rounds,
            players: BTreeMap::new(),
        }
    }

    /// Game configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Index of the current round.
    pub fn current_index(&self) -> RoundIndex {
        self.current
    }

    /// The current round.
    pub fn current_round(&self) -> GameResult<&Round> {
        self.round(self.current)
    }

    /// Round by index.
    pub fn round(&self, index: RoundIndex) -> GameResult<&Round> {
        self.rounds.get(&index).ok_or(GameError::UnknownRound(index))
    }

    pub(crate) fn round_mut(&mut self, index: RoundIndex) -> GameResult<&mut Round> {
        self.rounds.get_mut(&index).ok_or(GameError::UnknownRound(index))
    }

    /// Player record by round and identity.
    pub fn player(&self, round: RoundIndex, player: &PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&(round, *player))
    }

    /// All rounds, oldest first.
    pub fn rounds(&self) -> impl Iterator<Item = &Round> {
        self.rounds.values()
    }

    /// All player records, ordered by round then player.
    pub fn players(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.players.values()
    }

    fn active_record(&self, round: RoundIndex, player: PlayerId) -> GameResult<&PlayerRecord> {
        self.players
            .get(&(round, player))
            .filter(|record| record.active)
            .ok_or(GameError::NotActive { round, player })
    }

    // =========================================================================
    // JOIN
    // =========================================================================

    /// Pay the entry fee and join the current round.
    pub fn join<L: Ledger>(
        &mut self,
        player: PlayerId,
        paid: Amount,
        ledger: &mut L,
        events: &mut EventBuffer,
    ) -> GameResult<()> {
        let expected = self.config.entry_fee;
        if paid != expected {
            return Err(GameError::IncorrectFee { expected, paid });
        }

        let index = self.current;
        if self.players.contains_key(&(index, player)) {
            return Err(GameError::AlreadyJoined { round: index, player });
        }

        let round = self.round(index)?;
        let pool = round.pool.checked_add(paid).ok_or(GameError::PoolOverflow(index))?;
        let active_players = round.active_players.saturating_add(1);

        ledger.receive_deposit(player, paid)?;

        let round = self.round_mut(index)?;
        round.pool = pool;
        round.active_players = active_players;
        self.players.insert((index, player), PlayerRecord::new(index, player));

        info!("Player {} joined round {} (pool {})", player, index, pool);
        events.push(index, GameEventData::PlayerJoined { player_id: player, fee: paid });
        Ok(())
    }

    // =========================================================================
    // MOVE
    // =========================================================================

    /// Move one cell in `direction`.
    pub fn make_move<O: RandomnessOracle, L: Ledger>(
        &mut self,
        player: PlayerId,
        direction: Direction,
        protocol: &mut RandomnessProtocol,
        oracle: &mut O,
        ledger: &mut L,
        events: &mut EventBuffer,
    ) -> GameResult<MoveOutcome> {
        let index = self.current;
        let from = self.active_record(index, player)?.position;

        let round = self.round(index)?;
        if round.relocating {
            return Err(GameError::RoundBusy(index));
        }
        let treasure = round.treasure;

        let candidate = step(from, direction)
            .map_err(|_| GameError::OutOfBounds { from, direction })?;

        // Treasure moved onto a player who has not moved since.
        if from == treasure {
            info!("Player {} was already on the treasure at {}", player, treasure);
            let payout = self.end_round_and_pay(player, protocol, oracle, ledger, events)?;
            return Ok(MoveOutcome::Won { payout });
        }

        if candidate == treasure {
            self.commit_position(index, player, candidate, events)?;
            return match self.end_round_and_pay(player, protocol, oracle, ledger, events) {
                Ok(payout) => Ok(MoveOutcome::Won { payout }),
                Err(err) => {
                    self.set_position(index, player, from)?;
                    Err(err)
                }
            };
        }

        match relocation_rule_for(candidate)? {
            Some(rule) => {
                let context = RandomnessContext::ResolveMove { player, candidate, rule };
                let round = self.round_mut(index)?;
                let handle = protocol.request_randomness(oracle, round, context, events)?;
                debug!("Player {} move to {} awaits {:?}", player, candidate, rule);
                Ok(MoveOutcome::AwaitingRandomness { candidate, rule, handle })
            }
            None => {
                self.commit_position(index, player, candidate, events)?;
                Ok(MoveOutcome::Moved { to: candidate })
            }
        }
    }

    fn set_position(&mut self, round: RoundIndex, player: PlayerId, to: Cell) -> GameResult<Cell> {
        let record = self
            .players
            .get_mut(&(round, player))
            .filter(|record| record.active)
            .ok_or(GameError::NotActive { round, player })?;
        Ok(std::mem::replace(&mut record.position, to))
    }

    /// Commit a player's new position and announce it.
    pub(crate) fn commit_position(
        &mut self,
        round: RoundIndex,
        player: PlayerId,
        to: Cell,
        events: &mut EventBuffer,
    ) -> GameResult<()> {
        let from = self.set_position(round, player, to)?;
        events.push(round, GameEventData::PlayerRelocated { player_id: player, from, to });
        Ok(())
    }

    // =========================================================================
    // ROUND TRANSITIONS
    // =========================================================================

    /// Pay the winner 90% of the current pool, end the round and open the next.
    ///
    /// The next round's pool is whatever the ledger still holds after the
    /// payout, not a recomputed 10%.
    pub fn end_round_and_pay<O: RandomnessOracle, L: Ledger>(
        &mut self,
        winner: PlayerId,
        protocol: &mut RandomnessProtocol,
        oracle: &mut O,
        ledger: &mut L,
        events: &mut EventBuffer,
    ) -> GameResult<Amount> {
        let index = self.current;
        let pool = self.round(index)?.pool;
        let payout = payout_for(pool);
        let next = index + 1;

        let handle = protocol.submit(oracle, next, &RandomnessContext::SeedNewRound)?;
        if let Err(err) = ledger.pay_out(winner, payout) {
            warn!(
                "Payout of {} to {} failed; seed request {} is orphaned",
                payout,
                winner,
                handle.short()
            );
            return Err(err.into());
        }
        let residual = ledger.custody_balance();

        let now = events.at();
        let round = self.round_mut(index)?;
        round.winner = Some(winner);
        round.ended_at = Some(now);

        info!(
            "Round {} won by {}: pool {}, payout {}, carried {}",
            index, winner, pool, payout, residual
        );
        events.push(index, GameEventData::WinnerDeclared { player_id: winner, payout });
        events.push(
            index,
            GameEventData::RoundEnded { winner_id: Some(winner), carried_forward: residual },
        );

        self.open_round(residual, events);
        let round = self.round_mut(next)?;
        protocol.record(handle, round, RandomnessContext::SeedNewRound, events);
        Ok(payout)
    }

    /// End the current round without a winner once its duration has elapsed.
    ///
    /// Returns the pool carried into the next round.
    pub fn expire<O: RandomnessOracle>(
        &mut self,
        protocol: &mut RandomnessProtocol,
        oracle: &mut O,
        events: &mut EventBuffer,
    ) -> GameResult<Amount> {
        let index = self.current;
        let now = events.at();
        let round = self.round(index)?;

        if round.relocating {
            return Err(GameError::RoundBusy(index));
        }
        let deadline = round.started_at + self.config.round_duration();
        if now < deadline {
            return Err(GameError::NotYetExpirable {
                round: index,
                remaining_secs: (deadline - now).num_seconds().max(1),
            });
        }

        let carried = round.pool;
        let next = index + 1;
        let handle = protocol.submit(oracle, next, &RandomnessContext::SeedNewRound)?;

        let round = self.round_mut(index)?;
        round.ended_at = Some(now);
        info!("Round {} expired without a winner, carrying {}", index, carried);
        events.push(index, GameEventData::RoundEnded { winner_id: None, carried_forward: carried });

        self.open_round(carried, events);
        let round = self.round_mut(next)?;
        protocol.record(handle, round, RandomnessContext::SeedNewRound, events);
        Ok(carried)
    }

    fn open_round(&mut self, pool: Amount, events: &mut EventBuffer) {
        let index = self.current + 1;
        self.rounds.insert(index, Round::new(index, pool, events.at()));
        self.current = index;
        info!("Round {} begun with pool {}", index, pool);
        events.push(index, GameEventData::RoundBegun { seed_pool: pool });
    }

    // =========================================================================
    // WITHDRAW
    // =========================================================================

    /// Reclaim the entry fee from a finished, unwon round.
    ///
    /// Only rounds older than the current one qualify
    /// ([`GameError::RoundNotFinished`] otherwise). Rounds that had a winner
    /// are excluded with [`GameError::RoundWasWon`], since their pool was
    /// already paid out. Reduces that round's recorded pool. The next round's carried-forward
    /// pool is not adjusted.
    pub fn withdraw<L: Ledger>(
        &mut self,
        index: RoundIndex,
        player: PlayerId,
        ledger: &mut L,
        events: &mut EventBuffer,
    ) -> GameResult<Amount> {
        if index >= self.current {
            return Err(GameError::RoundNotFinished { requested: index, current: self.current });
        }

        let round = self.round(index)?;
        if !self.player(index, &player).is_some_and(|record| record.active) {
            return Err(GameError::NothingToWithdraw { round: index, player });
        }
        if round.winner.is_some() {
            return Err(GameError::RoundWasWon(index));
        }

        let amount = self.config.entry_fee;
        let pool = round.pool.checked_sub(amount).ok_or(GameError::PoolUnderflow {
            round: index,
            pool: round.pool,
            amount,
        })?;
        let active_players = round.active_players.saturating_sub(1);

        ledger.pay_out(player, amount)?;

        let round = self.round_mut(index)?;
        round.pool = pool;
        round.active_players = active_players;
        if let Some(record) = self.players.get_mut(&(index, player)) {
            record.active = false;
        }

        info!("Player {} withdrew {} from round {}", player, amount, index);
        events.push(index, GameEventData::FundsWithdrawn { player_id: player, amount });
        Ok(amount)
    }
}
