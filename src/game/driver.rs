//! Owned background task that paces the simulation
//!
//! Two intervals run against the shared [`GameLoop`]: a frame ticker at the
//! configured rate and a one-second heartbeat for countdowns. The task stops
//! on request, when the session leaves the active phases, or when the driver
//! is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::game::constants::timing;
use crate::game::game_loop::{GameLoop, GameLoopEvent};

/// Counters reported when the driver stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub frames: u64,
    pub seconds: u64,
}

pub struct SimulationDriver {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<DriverStats>>,
}

impl SimulationDriver {
    /// Spawns the driver task. Events from every trigger it runs are
    /// forwarded to `events`; a closed receiver is not an error.
    pub fn start(
        game: Arc<RwLock<GameLoop>>,
        config: &SimConfig,
        events: mpsc::UnboundedSender<GameLoopEvent>,
    ) -> Self {
        let frame_rate = config.frame_rate.max(1);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut frames = interval(Duration::from_secs_f64(1.0 / frame_rate as f64));
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut heartbeat = interval(Duration::from_millis(timing::COUNTDOWN_INTERVAL_MS));
            heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of an interval completes immediately
            heartbeat.tick().await;

            let input_capacity = game.read().await.input_capacity();
            info!(
                "Simulation driver started at {} Hz, input buffer of {} frames",
                frame_rate, input_capacity
            );
            let mut stats = DriverStats::default();
            let mut last_frame = Instant::now();

            loop {
                let produced = tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("Simulation driver received shutdown");
                        break;
                    }
                    now = frames.tick() => {
                        let dt = now.duration_since(last_frame).as_secs_f32();
                        last_frame = now;
                        stats.frames += 1;
                        game.write().await.tick(dt)
                    }
                    _ = heartbeat.tick() => {
                        stats.seconds += 1;
                        game.write().await.on_second()
                    }
                };

                for event in produced {
                    if events.send(event).is_err() {
                        warn!("Event receiver dropped, discarding simulation events");
                        break;
                    }
                }

                let phase = game.read().await.phase();
                if !phase.is_active() {
                    info!("Session entered {:?}, stopping driver", phase);
                    break;
                }
            }

            info!(
                "Simulation driver stopped after {} frames, {} seconds",
                stats.frames, stats.seconds
            );
            stats
        });

        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the task to stop and waits for it to finish
    pub async fn stop(mut self) -> DriverStats {
        if let Some(shutdown) = self.shutdown.take() {
            // The task may already have exited on its own
            let _ = shutdown.send(());
        }
        match self.handle.take() {
            Some(handle) => match handle.await {
                Ok(stats) => stats,
                Err(e) => {
                    warn!("Simulation driver task failed: {}", e);
                    DriverStats::default()
                }
            },
            None => DriverStats::default(),
        }
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
