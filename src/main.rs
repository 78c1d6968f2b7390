use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use labyrinth_core::config::SimConfig;
use labyrinth_core::game::autopilot::Autopilot;
use labyrinth_core::game::driver::SimulationDriver;
use labyrinth_core::game::game_loop::{GameLoop, GameLoopEvent};
use labyrinth_core::game::state::Phase;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Labyrinth simulation v{}", env!("CARGO_PKG_VERSION"));

    let config = SimConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: {} Hz, {} lives, start level {}, seed {:?}, {} demo levels",
        config.frame_rate, config.starting_lives, config.start_level + 1, config.seed, config.demo_levels
    );

    let game = Arc::new(RwLock::new(GameLoop::new(config.clone())));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    tokio::select! {
        result = run_demo(game.clone(), &config) => result?,
        _ = shutdown => {
            info!("Shutting down...");
        }
    }

    let hud = game.read().await.hud_snapshot();
    info!("Final state: {}", serde_json::to_string(&hud)?);
    Ok(())
}

/// Plays up to `demo_levels` levels with the autopilot at the wheel
async fn run_demo(game: Arc<RwLock<GameLoop>>, config: &SimConfig) -> anyhow::Result<()> {
    log_events(&game.write().await.start_game()?);

    for played in 1..=config.demo_levels {
        let outcome = play_level(game.clone(), config).await?;
        match outcome {
            Phase::LevelComplete if played < config.demo_levels => {
                log_events(&game.write().await.next_level()?);
            }
            Phase::LevelComplete => {
                info!("Demo finished after {} levels", played);
            }
            other => {
                info!("Demo ended in {:?}", other);
                break;
            }
        }
    }
    Ok(())
}

/// Drives one level from Memorize to LevelComplete or GameOver
async fn play_level(game: Arc<RwLock<GameLoop>>, config: &SimConfig) -> anyhow::Result<Phase> {
    let (mut autopilot, sender) = {
        let mut guard = game.write().await;
        debug!("Maze layout:\n{}", guard.state().level.grid);
        log_events(&guard.skip_countdown()?);
        (Autopilot::for_session(guard.state())?, guard.input_sender())
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let driver = SimulationDriver::start(game.clone(), config, tx);

    let mut steer = interval(Duration::from_secs_f32(config.frame_dt()));
    steer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let outcome = loop {
        steer.tick().await;
        while let Ok(event) = rx.try_recv() {
            log_events(std::slice::from_ref(&event));
        }

        let mut guard = game.write().await;
        match guard.phase() {
            Phase::Playing => {
                if guard.state().ability_ready() {
                    match guard.use_ability() {
                        Ok(events) => log_events(&events),
                        Err(e) => debug!("Ability not used: {}", e),
                    }
                }
                if autopilot.is_finished() {
                    // Knocked off the route; plan again from here
                    autopilot = Autopilot::for_session(guard.state())?;
                }
                let frame = autopilot.steer(&guard.state().player);
                if let Err(e) = sender.try_send(frame) {
                    debug!("Dropped autopilot input: {}", e);
                }
            }
            phase @ (Phase::LevelComplete | Phase::GameOver | Phase::Menu) => break phase,
            Phase::Memorize | Phase::MapPeek => {}
        }
    };

    let stats = driver.stop().await;
    while let Ok(event) = rx.try_recv() {
        log_events(std::slice::from_ref(&event));
    }
    info!(
        "Level {} ended in {:?} after {} frames",
        game.read().await.state().level.index + 1,
        outcome,
        stats.frames
    );
    Ok(outcome)
}

fn log_events(events: &[GameLoopEvent]) {
    for event in events {
        match event {
            GameLoopEvent::LevelStarted { level, size } => {
                info!("Level {} started ({}x{})", level + 1, size, size)
            }
            GameLoopEvent::PlayerHit {
                obstacle,
                lives_remaining,
            } => info!("Hit by {:?}, {} lives left", obstacle, lives_remaining),
            GameLoopEvent::LevelCompleted { level } => info!("Level {} complete", level + 1),
            GameLoopEvent::GameOver { level } => info!("Game over on level {}", level + 1),
            other => debug!("{:?}", other),
        }
    }
}
