//! Treasure Hunt Demo Host
//!
//! Runs a few rounds against the in-process oracle and ledger with
//! simulated players, logging every notification.

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use treasure_hunt::{
    game::{GameEventData, RoundPhase},
    Direction, ErrorKind, GameConfig, InMemoryLedger, Ledger, LocalOracle, ManualClock, PlayerId,
    TreasureHunt, VERSION,
};

/// Rounds to play before exiting.
const DEMO_ROUNDS: u64 = 3;

/// Players per round.
const DEMO_PLAYERS: u8 = 4;

/// Moves attempted before the round is left to expire.
const MAX_MOVES_PER_ROUND: u32 = 400;

type DemoGame = TreasureHunt<LocalOracle, InMemoryLedger, ManualClock>;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Treasure Hunt v{}", VERSION);

    let config = load_config()?;
    info!(
        "Entry fee: {}, round duration: {}s",
        config.entry_fee, config.round_duration_secs
    );

    demo(config)
}

fn load_config() -> anyhow::Result<GameConfig> {
    match std::env::var("TREASURE_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {path}"))?;
            GameConfig::from_json(&json).with_context(|| format!("invalid config file {path}"))
        }
        Err(_) => GameConfig::from_env().context("invalid config environment"),
    }
}

/// Play `DEMO_ROUNDS` rounds with randomly moving players.
fn demo(config: GameConfig) -> anyhow::Result<()> {
    info!("=== Starting Demo ===");

    let clock = ManualClock::new(chrono::Utc::now());
    let duration = config.round_duration();
    let fee = config.entry_fee;
    let mut game: DemoGame =
        TreasureHunt::new(config, LocalOracle::new(12345), InMemoryLedger::new(), clock.clone())?;

    let players: Vec<PlayerId> = (0..DEMO_PLAYERS).map(|_| PlayerId::random()).collect();

    while game.current_round_index() <= DEMO_ROUNDS {
        let round = game.current_round_index();
        for player in &players {
            game.join(*player, fee)?;
        }
        info!("Round {}: {} players, pool {}", round, players.len(), game.current_round()?.pool);

        let mut moves = 0;
        while game.current_round_index() == round {
            if game.pending_request().is_some() {
                deliver_randomness(&mut game)?;
                continue;
            }

            if moves >= MAX_MOVES_PER_ROUND {
                clock.advance(duration);
                game.expire()?;
                break;
            }
            moves += 1;

            let oracle = game.oracle_mut();
            let player = *oracle.choose(&players).context("no players")?;
            let direction = *oracle.choose(&Direction::ALL).context("no directions")?;
            match game.make_move(player, direction) {
                Ok(_) => {}
                Err(err) if err.kind() == ErrorKind::Validation => continue,
                Err(err) => return Err(err.into()),
            }
        }

        // Seed the round just opened so the next iteration starts Open
        while game.current_round()?.phase() == RoundPhase::AwaitingRandomness {
            deliver_randomness(&mut game)?;
        }
    }

    report(&mut game);
    Ok(())
}

/// Answer the game's live request. Requests orphaned by a failed payout stay
/// queued in the oracle and are never delivered.
fn deliver_randomness(game: &mut DemoGame) -> anyhow::Result<()> {
    let handle = game.pending_request().context("no request pending")?.handle;
    let fulfillment = game
        .oracle_mut()
        .fulfill(handle)
        .context("pending request unknown to the oracle")?;
    game.on_fulfillment(fulfillment.handle, &fulfillment.random_words)?;
    Ok(())
}

fn report(game: &mut DemoGame) {
    info!("=== Results ===");

    for event in game.drain_events() {
        match &event.data {
            GameEventData::WinnerDeclared { player_id, payout } => {
                info!("Round {}: {} won {}", event.round, player_id, payout);
            }
            GameEventData::RoundEnded { winner_id: None, carried_forward } => {
                warn!("Round {}: expired, {} carried forward", event.round, carried_forward);
            }
            _ => {}
        }
    }

    for round in game.snapshot().rounds {
        info!(
            "Round {}: treasure {}, pool {}, hash {}",
            round.index,
            round.treasure,
            round.pool,
            hex::encode(&round.compute_hash()[..8])
        );
    }
    info!("Custody balance: {}", game.ledger().custody_balance());
}
