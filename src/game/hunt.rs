//! Treasure Hunt Facade
//!
//! Single entry point for hosts. Wires the round engine and randomness
//! protocol to the oracle, ledger and clock, stamps each operation with the
//! current time, and keeps an append-only log of emitted events.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tracing::{debug, info, instrument};

use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::core::grid::Direction;
use crate::error::GameResult;
use crate::game::engine::{MoveOutcome, RoundEngine};
use crate::game::events::{EventBuffer, GameEvent, GameEventData};
use crate::game::randomness::{
    FulfillmentOutcome, PendingRequest, RandomnessContext, RandomnessProtocol,
};
use crate::game::state::{Amount, PlayerId, PlayerRecord, Round, RoundIndex};
use crate::ledger::Ledger;
use crate::oracle::{RandomnessOracle, RequestHandle};

// =============================================================================
// ACTION RESULT
// =============================================================================

/// Result of one successful operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionResult<T> {
    /// Operation-specific outcome
    pub outcome: T,
    /// Events emitted, in order
    pub events: Vec<GameEvent>,
    /// Whether a round ended
    pub round_ended: bool,
    /// Winner, if a round was won
    pub winner: Option<PlayerId>,
    /// Randomness request issued, if any
    pub request: Option<RequestHandle>,
}

impl<T> ActionResult<T> {
    fn new(outcome: T, events: Vec<GameEvent>) -> Self {
        let mut round_ended = false;
        let mut winner = None;
        let mut request = None;
        for event in &events {
            match &event.data {
                GameEventData::RoundEnded { winner_id, .. } => {
                    round_ended = true;
                    winner = *winner_id;
                }
                GameEventData::RandomnessRequested { handle } => request = Some(*handle),
                _ => {}
            }
        }
        Self { outcome, events, round_ended, winner, request }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Serializable view of the whole game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
    /// Active configuration
    pub config: GameConfig,
    /// Current round index
    pub current_round: RoundIndex,
    /// Every round, oldest first
    pub rounds: Vec<Round>,
    /// Every player record, by round then player
    pub players: Vec<PlayerRecord>,
    /// Outstanding randomness request
    pub pending: Option<PendingRequest>,
}

impl GameSnapshot {
    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Encode as bincode.
    pub fn to_bincode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }
}

// =============================================================================
// GAME
// =============================================================================

/// The treasure hunt game.
pub struct TreasureHunt<O, L, C = SystemClock> {
    engine: RoundEngine,
    protocol: RandomnessProtocol,
    oracle: O,
    ledger: L,
    clock: C,
    log: Vec<GameEvent>,
}

impl<O: RandomnessOracle, L: Ledger, C: Clock> TreasureHunt<O, L, C> {
    /// Open round 1 and request its treasure cell.
    ///
    /// Round 1 starts with whatever the ledger already holds in custody.
    pub fn new(config: GameConfig, mut oracle: O, ledger: L, clock: C) -> GameResult<Self> {
        let now = clock.now();
        let pool = ledger.custody_balance();
        let mut engine = RoundEngine::new(config, pool, now);
        let mut protocol = RandomnessProtocol::new();

        let mut events = EventBuffer::new(now);
        events.push(1, GameEventData::RoundBegun { seed_pool: pool });
        let round = engine.round_mut(1)?;
        protocol.request_randomness(&mut oracle, round, RandomnessContext::SeedNewRound, &mut events)?;

        info!("Treasure hunt started: round 1, pool {}", pool);
        Ok(Self {
            engine,
            protocol,
            oracle,
            ledger,
            clock,
            log: events.into_events(),
        })
    }

    fn finish<T>(&mut self, outcome: T, events: EventBuffer) -> ActionResult<T> {
        let events = events.into_events();
        for event in &events {
            debug!("Event {} (round {})", event.name(), event.round);
        }
        self.log.extend(events.iter().cloned());
        ActionResult::new(outcome, events)
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Join the current round by paying exactly the entry fee.
    #[instrument(skip(self), fields(round = self.engine.current_index()))]
    pub fn join(&mut self, player: PlayerId, paid: Amount) -> GameResult<ActionResult<()>> {
        let mut events = EventBuffer::new(self.clock.now());
        self.engine.join(player, paid, &mut self.ledger, &mut events)?;
        Ok(self.finish((), events))
    }

    /// Move one cell in `direction`.
    #[instrument(skip(self), fields(round = self.engine.current_index()))]
    pub fn make_move(
        &mut self,
        player: PlayerId,
        direction: Direction,
    ) -> GameResult<ActionResult<MoveOutcome>> {
        let mut events = EventBuffer::new(self.clock.now());
        let outcome = self.engine.make_move(
            player,
            direction,
            &mut self.protocol,
            &mut self.oracle,
            &mut self.ledger,
            &mut events,
        )?;
        Ok(self.finish(outcome, events))
    }

    /// End the current round without a winner. Returns the carried pool.
    #[instrument(skip(self), fields(round = self.engine.current_index()))]
    pub fn expire(&mut self) -> GameResult<ActionResult<Amount>> {
        let mut events = EventBuffer::new(self.clock.now());
        let carried = self.engine.expire(&mut self.protocol, &mut self.oracle, &mut events)?;
        Ok(self.finish(carried, events))
    }

    /// Reclaim the entry fee from a finished round nobody won.
    #[instrument(skip(self))]
    pub fn withdraw(
        &mut self,
        round: RoundIndex,
        player: PlayerId,
    ) -> GameResult<ActionResult<Amount>> {
        let mut events = EventBuffer::new(self.clock.now());
        let amount = self.engine.withdraw(round, player, &mut self.ledger, &mut events)?;
        Ok(self.finish(amount, events))
    }

    /// Deliver the oracle's answer for `handle`.
    #[instrument(skip(self, random_words), fields(words = random_words.len()))]
    pub fn on_fulfillment(
        &mut self,
        handle: RequestHandle,
        random_words: &[u64],
    ) -> GameResult<ActionResult<FulfillmentOutcome>> {
        let mut events = EventBuffer::new(self.clock.now());
        let outcome = self.protocol.on_fulfillment(
            &mut self.engine,
            &mut self.oracle,
            &mut self.ledger,
            handle,
            random_words,
            &mut events,
        )?;
        Ok(self.finish(outcome, events))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Index of the current round.
    pub fn current_round_index(&self) -> RoundIndex {
        self.engine.current_index()
    }

    /// The current round.
    pub fn current_round(&self) -> GameResult<&Round> {
        self.engine.current_round()
    }

    /// Round by index.
    pub fn round(&self, index: RoundIndex) -> GameResult<&Round> {
        self.engine.round(index)
    }

    /// Player record by round and identity.
    pub fn player(&self, round: RoundIndex, player: &PlayerId) -> Option<&PlayerRecord> {
        self.engine.player(round, player)
    }

    /// The outstanding randomness request, if any.
    pub fn pending_request(&self) -> Option<&PendingRequest> {
        self.protocol.pending()
    }

    /// Game configuration.
    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    /// Every event emitted so far (since the last drain).
    pub fn events(&self) -> &[GameEvent] {
        &self.log
    }

    /// Take the event log, leaving it empty.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.log)
    }

    /// Oracle collaborator.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Oracle collaborator, mutably.
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Ledger collaborator.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Ledger collaborator, mutably.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Capture the full game state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            taken_at: self.clock.now(),
            config: self.engine.config().clone(),
            current_round: self.engine.current_index(),
            rounds: self.engine.rounds().cloned().collect(),
            players: self.engine.players().cloned().collect(),
            pending: self.protocol.pending().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::core::grid::Cell;
    use crate::error::GameError;
    use crate::game::randomness::RelocationRule;
    use crate::game::state::RoundPhase;
    use crate::ledger::{InMemoryLedger, LedgerError};
    use crate::oracle::LocalOracle;
    use chrono::Duration;

    const FEE: Amount = 100;

    type Game = TreasureHunt<LocalOracle, InMemoryLedger, ManualClock>;

    fn cell(i: u8) -> Cell {
        Cell::new(i).unwrap()
    }

    fn pid(n: u8) -> PlayerId {
        PlayerId::new([n; 16])
    }

    fn config() -> GameConfig {
        GameConfig { entry_fee: FEE, round_duration_secs: 60 }
    }

    fn new_game() -> (Game, ManualClock) {
        let clock = ManualClock::at_unix(1_700_000_000);
        let game = TreasureHunt::new(config(), LocalOracle::new(7), InMemoryLedger::new(), clock.clone())
            .unwrap();
        (game, clock)
    }

    /// Answer the outstanding request with `value`.
    fn answer(game: &mut Game, value: u64) -> GameResult<ActionResult<FulfillmentOutcome>> {
        let handle = game.pending_request().unwrap().handle;
        game.oracle_mut().take_next();
        game.on_fulfillment(handle, &[value])
    }

    /// Game with round 1 seeded at `treasure`.
    fn seeded_game(treasure: u8) -> (Game, ManualClock) {
        let (mut game, clock) = new_game();
        answer(&mut game, treasure as u64).unwrap();
        (game, clock)
    }

    fn place(game: &mut Game, player: PlayerId, at: u8) {
        let round = game.current_round_index();
        let mut events = EventBuffer::new(game.clock.now());
        game.engine.commit_position(round, player, cell(at), &mut events).unwrap();
    }

    #[test]
    fn test_new_game_awaits_seed() {
        let (game, _) = new_game();
        let round = game.current_round().unwrap();
        assert_eq!(round.index, 1);
        assert_eq!(round.phase(), RoundPhase::AwaitingRandomness);

        let pending = game.pending_request().unwrap();
        assert_eq!(pending.round, 1);
        assert_eq!(pending.context, RandomnessContext::SeedNewRound);
        assert_eq!(game.oracle().outstanding_count(), 1);

        let names: Vec<_> = game.events().iter().map(GameEvent::name).collect();
        assert_eq!(names, ["round_begun", "randomness_requested"]);
    }

    #[test]
    fn test_first_round_pool_uses_existing_custody() {
        let clock = ManualClock::at_unix(0);
        let mut ledger = InMemoryLedger::new();
        ledger.donate(500);
        let game = TreasureHunt::new(config(), LocalOracle::new(1), ledger, clock).unwrap();
        assert_eq!(game.current_round().unwrap().pool, 500);
    }

    #[test]
    fn test_new_fails_when_oracle_unavailable() {
        let mut oracle = LocalOracle::new(1);
        oracle.fail_next_submission();
        let result = TreasureHunt::new(config(), oracle, InMemoryLedger::new(), ManualClock::at_unix(0));
        assert!(matches!(result, Err(GameError::Oracle(_))));
    }

    #[test]
    fn test_joins_allowed_while_awaiting_seed() {
        let (mut game, _) = new_game();
        let result = game.join(pid(1), FEE).unwrap();
        assert_eq!(result.events.len(), 1);
        assert!(!result.round_ended);

        // Moves are not
        assert_eq!(
            game.make_move(pid(1), Direction::Right).unwrap_err(),
            GameError::RoundBusy(1)
        );
    }

    #[test]
    fn test_round_won_at_cell_80() {
        let (mut game, _) = seeded_game(80);
        game.join(pid(1), FEE).unwrap();
        game.join(pid(2), FEE).unwrap();
        game.join(pid(3), FEE).unwrap();
        place(&mut game, pid(1), 79);

        let result = game.make_move(pid(1), Direction::Right).unwrap();
        assert_eq!(result.outcome, MoveOutcome::Won { payout: 270 });
        assert!(result.round_ended);
        assert_eq!(result.winner, Some(pid(1)));
        assert!(result.request.is_some());

        let names: Vec<_> = result.events.iter().map(GameEvent::name).collect();
        assert_eq!(
            names,
            [
                "player_relocated",
                "winner_declared",
                "round_ended",
                "round_begun",
                "randomness_requested",
            ]
        );

        assert_eq!(game.ledger().paid_to(&pid(1)), 270);
        assert_eq!(game.round(1).unwrap().phase(), RoundPhase::Ended);

        let next = game.current_round().unwrap();
        assert_eq!(next.index, 2);
        assert_eq!(next.pool, 30);
        assert_eq!(next.pool, game.ledger().custody_balance());
        assert_eq!(next.phase(), RoundPhase::AwaitingRandomness);

        // Next round seeded by the new request
        let outcome = answer(&mut game, 1_017).unwrap().outcome;
        assert_eq!(outcome, FulfillmentOutcome::RoundSeeded { round: 2, treasure: cell(17) });
        assert_eq!(game.current_round().unwrap().phase(), RoundPhase::Open);
    }

    #[test]
    fn test_prime_move_full_reset() {
        let (mut game, _) = seeded_game(50);
        game.join(pid(1), FEE).unwrap();
        place(&mut game, pid(1), 2);

        let result = game.make_move(pid(1), Direction::Right).unwrap();
        assert!(matches!(
            result.outcome,
            MoveOutcome::AwaitingRandomness { rule: RelocationRule::FullReset, .. }
        ));
        assert_eq!(game.player(1, &pid(1)).unwrap().position, cell(2));

        let outcome = answer(&mut game, 13).unwrap().outcome;
        assert_eq!(
            outcome,
            FulfillmentOutcome::PlayerMoved { player: pid(1), position: cell(3), treasure: cell(13) }
        );
        assert_eq!(game.player(1, &pid(1)).unwrap().position, cell(3));
        assert_eq!(game.current_round().unwrap().treasure, cell(13));
        assert!(game.pending_request().is_none());
    }

    #[test]
    fn test_multiple_of_five_adjacent_move() {
        let (mut game, _) = seeded_game(55);
        game.join(pid(1), FEE).unwrap();
        place(&mut game, pid(1), 11);

        let result = game.make_move(pid(1), Direction::Left).unwrap();
        assert!(matches!(
            result.outcome,
            MoveOutcome::AwaitingRandomness { rule: RelocationRule::AdjacentMove, .. }
        ));

        // Neighbors of 55 are [54, 45, 56, 65]
        let result = answer(&mut game, 1).unwrap();
        assert_eq!(
            result.outcome,
            FulfillmentOutcome::PlayerMoved { player: pid(1), position: cell(10), treasure: cell(45) }
        );
        let moved = result
            .events
            .iter()
            .find(|e| e.name() == "treasure_relocated")
            .unwrap();
        assert_eq!(
            moved.data,
            GameEventData::TreasureRelocated {
                from: Some(cell(55)),
                to: cell(45),
                rule: Some(RelocationRule::AdjacentMove),
            }
        );
    }

    #[test]
    fn test_relocation_onto_candidate_wins() {
        let (mut game, _) = seeded_game(40);
        game.join(pid(1), FEE).unwrap();
        place(&mut game, pid(1), 2);
        game.make_move(pid(1), Direction::Right).unwrap();

        let result = answer(&mut game, 203).unwrap();
        assert_eq!(
            result.outcome,
            FulfillmentOutcome::Won { player: pid(1), payout: 90, treasure: cell(3) }
        );
        assert_eq!(result.winner, Some(pid(1)));

        // The move request was settled, and the next seed request replaced it
        let pending = game.pending_request().unwrap();
        assert_eq!(pending.round, 2);
        assert_eq!(pending.context, RandomnessContext::SeedNewRound);
    }

    #[test]
    fn test_failed_payout_on_fulfillment_keeps_request() {
        let (mut game, _) = seeded_game(40);
        game.join(pid(1), FEE).unwrap();
        place(&mut game, pid(1), 2);
        game.make_move(pid(1), Direction::Right).unwrap();
        let handle = game.pending_request().unwrap().handle;
        let logged = game.events().len();

        game.ledger_mut().fail_next_transfer();
        let err = game.on_fulfillment(handle, &[3]).unwrap_err();
        assert_eq!(err, GameError::Ledger(LedgerError::Rejected("injected failure".into())));

        let round = game.current_round().unwrap();
        assert_eq!(round.index, 1);
        assert_eq!(round.treasure, cell(40));
        assert_eq!(round.phase(), RoundPhase::AwaitingRandomness);
        assert_eq!(game.pending_request().unwrap().handle, handle);
        assert_eq!(game.events().len(), logged);

        // Redelivery succeeds
        let result = game.on_fulfillment(handle, &[3]).unwrap();
        assert!(result.round_ended);
    }

    #[test]
    fn test_plain_move_commits_position() {
        let (mut game, _) = seeded_game(99);
        game.join(pid(1), FEE).unwrap();
        place(&mut game, pid(1), 6);

        let result = game.make_move(pid(1), Direction::Down).unwrap();
        assert_eq!(result.outcome, MoveOutcome::Moved { to: cell(16) });
        assert_eq!(result.request, None);
        assert_eq!(
            result.events[0].data,
            GameEventData::PlayerRelocated { player_id: pid(1), from: cell(6), to: cell(16) }
        );
    }

    #[test]
    fn test_expire_lifecycle() {
        let (mut game, clock) = seeded_game(99);
        game.join(pid(1), FEE).unwrap();
        game.join(pid(2), FEE).unwrap();

        clock.advance(Duration::seconds(30));
        assert_eq!(
            game.expire().unwrap_err(),
            GameError::NotYetExpirable { round: 1, remaining_secs: 30 }
        );

        clock.advance(Duration::seconds(30));
        let result = game.expire().unwrap();
        assert_eq!(result.outcome, 2 * FEE);
        assert!(result.round_ended);
        assert_eq!(result.winner, None);

        let next = game.current_round().unwrap();
        assert_eq!(next.index, 2);
        assert_eq!(next.pool, 2 * FEE);
        assert_eq!(next.started_at, clock.now());

        // Stakes from the expired round can be reclaimed
        let result = game.withdraw(1, pid(2)).unwrap();
        assert_eq!(result.outcome, FEE);
        assert_eq!(game.ledger().paid_to(&pid(2)), FEE);
        assert_eq!(
            game.withdraw(2, pid(1)).unwrap_err(),
            GameError::RoundNotFinished { requested: 2, current: 2 }
        );
    }

    #[test]
    fn test_withdraw_never_joined() {
        let (mut game, clock) = seeded_game(99);
        clock.advance(Duration::seconds(60));
        game.expire().unwrap();
        assert_eq!(
            game.withdraw(1, pid(4)).unwrap_err(),
            GameError::NothingToWithdraw { round: 1, player: pid(4) }
        );
    }

    /// Withdrawals do not reduce the pool already carried forward, so a
    /// later winner can be owed more than custody holds.
    #[test]
    fn test_carried_pool_can_outgrow_custody() {
        let (mut game, clock) = seeded_game(99);
        game.join(pid(1), FEE).unwrap();
        game.join(pid(2), FEE).unwrap();
        clock.advance(Duration::seconds(60));
        game.expire().unwrap();
        game.withdraw(1, pid(1)).unwrap();
        game.withdraw(1, pid(2)).unwrap();

        answer(&mut game, 1).unwrap();
        game.join(pid(3), FEE).unwrap();
        assert_eq!(game.current_round().unwrap().pool, 3 * FEE);
        assert_eq!(game.ledger().custody_balance(), FEE);

        // Payout of 270 exceeds custody of 100
        let err = game.make_move(pid(3), Direction::Right).unwrap_err();
        assert!(matches!(err, GameError::Ledger(LedgerError::InsufficientFunds { .. })));
        assert_eq!(game.current_round_index(), 2);
    }

    #[test]
    fn test_failed_operations_leave_no_events() {
        let (mut game, _) = seeded_game(99);
        let logged = game.events().len();

        assert!(game.join(pid(1), FEE + 1).is_err());
        game.ledger_mut().fail_next_transfer();
        assert!(game.join(pid(1), FEE).is_err());
        assert!(game.make_move(pid(1), Direction::Right).is_err());
        assert!(game.expire().is_err());

        assert_eq!(game.events().len(), logged);
        assert_eq!(game.current_round().unwrap().pool, 0);
    }

    #[test]
    fn test_move_oracle_failure_is_atomic() {
        let (mut game, _) = seeded_game(99);
        game.join(pid(1), FEE).unwrap();
        place(&mut game, pid(1), 2);
        game.oracle_mut().fail_next_submission();

        assert!(matches!(
            game.make_move(pid(1), Direction::Right),
            Err(GameError::Oracle(_))
        ));
        assert_eq!(game.current_round().unwrap().phase(), RoundPhase::Open);
        assert!(game.pending_request().is_none());

        // Retry goes through
        assert!(game.make_move(pid(1), Direction::Right).is_ok());
    }

    #[test]
    fn test_orphaned_request_does_not_block_next_seed() {
        let (mut game, _) = seeded_game(3);
        game.join(pid(1), FEE).unwrap();
        place(&mut game, pid(1), 2);

        // Failed payout leaves the round 2 seed request behind in the oracle
        game.ledger_mut().fail_next_transfer();
        assert!(game.make_move(pid(1), Direction::Right).is_err());
        game.make_move(pid(1), Direction::Right).unwrap();
        assert_eq!(game.oracle().outstanding_count(), 2);

        let orphan = game.oracle_mut().fulfill_next().unwrap();
        assert_eq!(
            game.on_fulfillment(orphan.handle, &orphan.random_words).unwrap_err(),
            GameError::UnknownRequest(orphan.handle)
        );

        let live = game.pending_request().unwrap().handle;
        let fulfillment = game.oracle_mut().fulfill(live).unwrap();
        let result = game
            .on_fulfillment(fulfillment.handle, &fulfillment.random_words)
            .unwrap();
        assert!(matches!(result.outcome, FulfillmentOutcome::RoundSeeded { round: 2, .. }));
        assert_eq!(game.oracle().outstanding_count(), 0);
    }

    #[test]
    fn test_withdraw_from_won_round_rejected() {
        let (mut game, _) = seeded_game(1);
        game.join(pid(1), FEE).unwrap();
        game.join(pid(2), FEE).unwrap();
        game.make_move(pid(1), Direction::Right).unwrap();

        assert_eq!(game.withdraw(1, pid(2)).unwrap_err(), GameError::RoundWasWon(1));
        assert_eq!(game.ledger().paid_to(&pid(2)), 0);
    }

    #[test]
    fn test_drain_events() {
        let (mut game, _) = seeded_game(99);
        game.join(pid(1), FEE).unwrap();
        let drained = game.drain_events();
        assert_eq!(drained.last().map(GameEvent::name), Some("player_joined"));
        assert!(game.events().is_empty());
    }

    #[test]
    fn test_snapshot_encodings() {
        let (mut game, _) = seeded_game(42);
        game.join(pid(1), FEE).unwrap();

        let snapshot = game.snapshot();
        assert_eq!(snapshot.current_round, 1);
        assert_eq!(snapshot.rounds.len(), 1);
        assert_eq!(snapshot.players.len(), 1);
        assert!(snapshot.pending.is_none());

        let json = snapshot.to_json().unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);

        assert!(!snapshot.to_bincode().unwrap().is_empty());
    }

    #[test]
    fn test_local_oracle_drives_game() {
        let (mut game, _) = new_game();
        let fulfillment = game.oracle_mut().fulfill_next().unwrap();
        let result = game
            .on_fulfillment(fulfillment.handle, &fulfillment.random_words)
            .unwrap();
        assert!(matches!(result.outcome, FulfillmentOutcome::RoundSeeded { round: 1, .. }));
        assert_eq!(game.oracle().outstanding_count(), 0);
    }
}
