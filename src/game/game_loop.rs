//! Session state machine and per-frame simulation
//!
//! [`GameLoop`] owns the [`SessionState`] and is its only writer. Level
//! triggers (`start_game`, `next_level`, `peek_map`, ...) move it between
//! phases, `on_second` drives the countdowns and the ability cooldown, and
//! `tick` integrates one frame of play. Every mutation reports what happened
//! as [`GameLoopEvent`]s.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::game::constants::{power_up, session};
use crate::game::input_buffer::{InputBuffer, InputFrame, InputSender};
use crate::game::level::{build_level, LevelConfig};
use crate::game::snapshot::{HudSnapshot, RenderSnapshot};
use crate::game::state::{EntityId, Phase, PlayerState, PowerUpKind, SessionState};
use crate::game::systems::collision::{CollisionError, CollisionResolver};
use crate::game::systems::{hazards, movement, pickups};
use crate::game::timers::TimerKind;
use crate::maze::{self, MazeError};

/// Something observable that happened during a trigger or tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameLoopEvent {
    PhaseChanged { from: Phase, to: Phase },
    LevelStarted { level: usize, size: usize },
    /// `obstacle` is None for hits registered from outside the simulation
    PlayerHit {
        obstacle: Option<EntityId>,
        lives_remaining: u32,
    },
    ObstaclesCleared { ids: Vec<EntityId> },
    PowerUpCollected { id: EntityId, kind: PowerUpKind },
    PathRevealed { cells: usize },
    RevealExpired,
    InvulnerabilityEnded,
    LevelCompleted { level: usize },
    GameOver { level: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {action} during {phase:?}")]
    InvalidTransition { action: &'static str, phase: Phase },
    #[error("cannot {action} while paused")]
    Paused { action: &'static str },
    #[error("ability is cooling down ({remaining}s left)")]
    AbilityCoolingDown { remaining: u32 },
    #[error("no obstacle within ability range")]
    NothingInRange,
    #[error("no map peeks left on this level")]
    NoPeeksLeft,
    #[error(transparent)]
    Maze(#[from] MazeError),
    #[error(transparent)]
    Collision(#[from] CollisionError),
}

pub type SessionResult = Result<Vec<GameLoopEvent>, SessionError>;

/// Main game loop that processes triggers, countdowns and ticks
pub struct GameLoop {
    config: SimConfig,
    state: SessionState,
    resolver: CollisionResolver,
    rng: StdRng,
    /// Most recent input frame; held across ticks until replaced
    input: InputFrame,
    input_buffer: InputBuffer,
}

impl GameLoop {
    pub fn new(config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut state = SessionState::new();
        state.lives = config.starting_lives;
        let input_buffer = InputBuffer::new(config.input_capacity);
        debug!("Input buffer holds up to {} frames", input_buffer.capacity());

        Self {
            input_buffer,
            config,
            state,
            resolver: CollisionResolver::default(),
            rng,
            input: InputFrame::IDLE,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Handle for pushing input from another thread or task
    pub fn input_sender(&self) -> InputSender {
        self.input_buffer.sender()
    }

    /// Most input frames that can wait between ticks
    pub fn input_capacity(&self) -> usize {
        self.input_buffer.capacity()
    }

    /// Replaces the current input directly, bypassing the buffer
    pub fn set_input(&mut self, frame: InputFrame) {
        self.input = frame;
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::from_session(&self.state)
    }

    pub fn hud_snapshot(&self) -> HudSnapshot {
        HudSnapshot::from_session(&self.state)
    }

    fn set_phase(&mut self, to: Phase, events: &mut Vec<GameLoopEvent>) {
        let from = self.state.phase;
        if from == to {
            return;
        }
        self.state.phase = to;
        info!("Phase {:?} -> {:?} (level {})", from, to, self.state.level.index + 1);
        events.push(GameLoopEvent::PhaseChanged { from, to });
    }

    fn require(&self, action: &'static str, allowed: &[Phase]) -> Result<(), SessionError> {
        if allowed.contains(&self.state.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                phase: self.state.phase,
            })
        }
    }

    /// Menu -> Memorize on the configured first level with full lives
    pub fn start_game(&mut self) -> SessionResult {
        self.require("start a game", &[Phase::Menu])?;
        self.state.lives = self.config.starting_lives;
        self.load_level(self.config.start_level)
    }

    /// Builds level `index` and enters Memorize.
    ///
    /// Valid from any phase. Everything tied to the previous level is
    /// dropped: pending timers, reveal, cooldown, pause and queued input.
    pub fn load_level(&mut self, index: usize) -> SessionResult {
        let config = LevelConfig::for_index(index);
        let level = build_level(&mut self.state, index, config, &mut self.rng)?;

        let state = &mut self.state;
        state.timers.cancel_all();
        state.player = PlayerState::new(level.start.center(), level.start_heading);
        state.revealed_path.clear();
        state.reveal_expiry = None;
        state.ability_cooldown = 0;
        state.obstacle_in_range = false;
        state.paused = false;
        state.sim_time = 0.0;
        state.peeks_remaining = session::PEEKS_PER_LEVEL;
        state.countdown = level.memorize_secs;
        state.level = level;

        self.input = InputFrame::IDLE;
        let stale = self.input_buffer.pending_count();
        if stale > 0 {
            debug!("Discarding {} queued input frames", stale);
        }
        self.input_buffer.clear();

        let mut events = vec![GameLoopEvent::LevelStarted {
            level: index,
            size: config.size,
        }];
        // Entering Memorize from Memorize still restarts the countdown
        self.set_phase(Phase::Memorize, &mut events);
        Ok(events)
    }

    /// Ends a Memorize or MapPeek countdown early
    pub fn skip_countdown(&mut self) -> SessionResult {
        if !self.state.phase.has_countdown() {
            return Err(SessionError::InvalidTransition {
                action: "skip the countdown",
                phase: self.state.phase,
            });
        }
        self.state.countdown = 0;
        let mut events = Vec::new();
        self.set_phase(Phase::Playing, &mut events);
        Ok(events)
    }

    /// Spends a peek charge to show the map for a few seconds
    pub fn peek_map(&mut self) -> SessionResult {
        self.require("peek at the map", &[Phase::Playing])?;
        if self.state.paused {
            return Err(SessionError::Paused {
                action: "peek at the map",
            });
        }
        if self.state.peeks_remaining == 0 {
            return Err(SessionError::NoPeeksLeft);
        }
        self.state.peeks_remaining -= 1;
        self.state.countdown = session::PEEK_SECS;
        let mut events = Vec::new();
        self.set_phase(Phase::MapPeek, &mut events);
        Ok(events)
    }

    pub fn next_level(&mut self) -> SessionResult {
        self.require("advance a level", &[Phase::LevelComplete])?;
        self.load_level(self.state.level.index + 1)
    }

    /// GameOver -> Menu with lives restored
    pub fn restart(&mut self) -> SessionResult {
        self.require("restart", &[Phase::GameOver])?;
        self.state.lives = self.config.starting_lives;
        let mut events = Vec::new();
        self.set_phase(Phase::Menu, &mut events);
        Ok(events)
    }

    /// Abandons the current game from any phase other than Menu
    pub fn return_to_menu(&mut self) -> SessionResult {
        if self.state.phase == Phase::Menu {
            return Err(SessionError::InvalidTransition {
                action: "return to the menu",
                phase: Phase::Menu,
            });
        }
        let state = &mut self.state;
        state.timers.cancel_all();
        state.player.invulnerability = None;
        state.revealed_path.clear();
        state.reveal_expiry = None;
        state.paused = false;
        state.countdown = 0;
        state.lives = self.config.starting_lives;
        self.input = InputFrame::IDLE;
        self.input_buffer.clear();

        let mut events = Vec::new();
        self.set_phase(Phase::Menu, &mut events);
        Ok(events)
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.require("pause", &[Phase::Memorize, Phase::Playing, Phase::MapPeek])?;
        if !self.state.paused {
            self.state.paused = true;
            info!("Paused at {:.2}s", self.state.sim_time);
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.require("resume", &[Phase::Memorize, Phase::Playing, Phase::MapPeek])?;
        if self.state.paused {
            self.state.paused = false;
            info!("Resumed at {:.2}s", self.state.sim_time);
        }
        Ok(())
    }

    /// Flips the pause flag, returning the new value
    pub fn toggle_pause(&mut self) -> Result<bool, SessionError> {
        if self.state.paused {
            self.resume()?;
        } else {
            self.pause()?;
        }
        Ok(self.state.paused)
    }

    /// Area-clear: removes every obstacle in range and starts the cooldown.
    ///
    /// Obstacle positions are taken at the current simulation time, the
    /// same clock the tick used to enable the ability.
    pub fn use_ability(&mut self) -> SessionResult {
        self.require("use the ability", &[Phase::Playing])?;
        if self.state.paused {
            return Err(SessionError::Paused {
                action: "use the ability",
            });
        }
        if self.state.ability_cooldown > 0 {
            return Err(SessionError::AbilityCoolingDown {
                remaining: self.state.ability_cooldown,
            });
        }

        let state = &mut self.state;
        let ids = hazards::clear_area(&mut state.level.obstacles, state.player.position, state.sim_time);
        if ids.is_empty() {
            return Err(SessionError::NothingInRange);
        }
        state.ability_cooldown = session::ABILITY_COOLDOWN_SECS;
        state.obstacle_in_range =
            hazards::scan(&state.level.obstacles, state.player.position, state.sim_time).in_ability_range;
        debug!("Area clear removed {} obstacles", ids.len());

        Ok(vec![GameLoopEvent::ObstaclesCleared { ids }])
    }

    /// Registers a hit from outside the simulation, honouring
    /// invulnerability. Only valid while playing.
    pub fn register_hit(&mut self) -> SessionResult {
        self.require("register a hit", &[Phase::Playing])?;
        let mut events = Vec::new();
        if !self.state.player.is_invulnerable() {
            self.apply_hit(None, &mut events);
        }
        Ok(events)
    }

    /// One-second heartbeat: counts down Memorize/MapPeek and the ability
    /// cooldown. Does nothing while paused.
    pub fn on_second(&mut self) -> Vec<GameLoopEvent> {
        let mut events = Vec::new();
        if self.state.paused {
            return events;
        }

        let phase = self.state.phase;
        if matches!(phase, Phase::Playing | Phase::MapPeek) && self.state.ability_cooldown > 0 {
            self.state.ability_cooldown -= 1;
        }

        if phase.has_countdown() {
            self.state.countdown = self.state.countdown.saturating_sub(1);
            if self.state.countdown == 0 {
                self.set_phase(Phase::Playing, &mut events);
            }
        }
        events
    }

    /// Integrates one frame of play.
    ///
    /// Input is drained every call so stale frames never pile up, but the
    /// simulation only advances while playing and unpaused. `dt` is capped
    /// at [`session::MAX_FRAME_DT`].
    pub fn tick(&mut self, dt: f32) -> Vec<GameLoopEvent> {
        let mut events = Vec::new();
        if !self.input_buffer.is_empty() {
            if let Some(frame) = self.input_buffer.drain_latest() {
                self.input = frame;
            }
        }
        if !self.state.is_simulating() {
            return events;
        }

        let dt = if dt.is_finite() {
            dt.clamp(0.0, session::MAX_FRAME_DT)
        } else {
            0.0
        };
        self.state.sim_time += dt;
        self.fire_timers(&mut events);

        // Rotation first so the move uses this frame's heading
        let state = &mut self.state;
        movement::apply_rotation(&mut state.player, &self.input, dt);
        if let Err(e) = movement::apply_translation(
            &mut state.player,
            &self.input,
            &state.level.grid,
            &self.resolver,
            dt,
        ) {
            warn!("Player left the maze ({}), returning to start", e);
            state.player.position = state.level.start.center();
        }

        let scan = hazards::scan(&state.level.obstacles, state.player.position, state.sim_time);
        state.obstacle_in_range = scan.in_ability_range;
        if let Some(id) = scan.hit {
            if !state.player.is_invulnerable() {
                self.apply_hit(Some(id), &mut events);
                if self.state.phase == Phase::GameOver {
                    return events;
                }
            }
        }

        let position = self.state.player.position;
        for (id, kind) in pickups::collect(&mut self.state.level.power_ups, position) {
            debug!("Collected {:?} power-up {}", kind, id);
            events.push(GameLoopEvent::PowerUpCollected { id, kind });
            match kind {
                PowerUpKind::ExtraLife => self.state.lives += 1,
                PowerUpKind::MapReveal => self.reveal_path(&mut events),
            }
        }

        let end = self.state.level.end.center();
        if self.state.player.position.distance_to(end) < session::WIN_DISTANCE {
            self.complete_level(&mut events);
        }

        events
    }

    fn fire_timers(&mut self, events: &mut Vec<GameLoopEvent>) {
        let state = &mut self.state;
        for (token, kind) in state.timers.fire_due(state.sim_time) {
            match kind {
                TimerKind::InvulnerabilityEnds => {
                    if state.player.invulnerability == Some(token) {
                        state.player.invulnerability = None;
                        debug!("Invulnerability ended at {:.2}s", state.sim_time);
                        events.push(GameLoopEvent::InvulnerabilityEnded);
                    }
                }
                TimerKind::RevealExpires => {
                    if state.reveal_expiry == Some(token) {
                        state.reveal_expiry = None;
                        state.revealed_path.clear();
                        debug!("Revealed path expired at {:.2}s", state.sim_time);
                        events.push(GameLoopEvent::RevealExpired);
                    }
                }
            }
        }
    }

    fn apply_hit(&mut self, obstacle: Option<EntityId>, events: &mut Vec<GameLoopEvent>) {
        let state = &mut self.state;
        state.lives = state.lives.saturating_sub(1);
        info!("Player hit by {:?}, {} lives left", obstacle, state.lives);
        events.push(GameLoopEvent::PlayerHit {
            obstacle,
            lives_remaining: state.lives,
        });

        if state.lives == 0 {
            state.timers.cancel_all();
            state.player.invulnerability = None;
            state.reveal_expiry = None;
            state.revealed_path.clear();
            events.push(GameLoopEvent::GameOver {
                level: state.level.index,
            });
            self.set_phase(Phase::GameOver, events);
        } else {
            let due_at = state.sim_time + session::INVULNERABILITY_DURATION;
            state.player.invulnerability = Some(state.timers.schedule(TimerKind::InvulnerabilityEnds, due_at));
        }
    }

    /// Stages the route from the player to the exit, replacing any reveal
    /// already showing.
    fn reveal_path(&mut self, events: &mut Vec<GameLoopEvent>) {
        let state = &mut self.state;
        let route = match maze::shortest_path_between(
            &state.level.grid,
            state.player.position,
            state.level.end.center(),
        ) {
            Ok(route) => route,
            Err(e) => {
                warn!("Map reveal failed: {}", e);
                return;
            }
        };

        if let Some(previous) = state.reveal_expiry.take() {
            state.timers.cancel(previous);
        }
        let due_at = state.sim_time + power_up::REVEAL_DURATION;
        state.reveal_expiry = Some(state.timers.schedule(TimerKind::RevealExpires, due_at));
        events.push(GameLoopEvent::PathRevealed { cells: route.len() });
        state.revealed_path = route;
    }

    fn complete_level(&mut self, events: &mut Vec<GameLoopEvent>) {
        let state = &mut self.state;
        state.timers.cancel_all();
        state.player.invulnerability = None;
        state.reveal_expiry = None;
        state.revealed_path.clear();
        state.obstacle_in_range = false;
        info!(
            "Level {} complete in {:.1}s with {} lives",
            state.level.index + 1,
            state.sim_time,
            state.lives
        );
        events.push(GameLoopEvent::LevelCompleted {
            level: state.level.index,
        });
        self.set_phase(Phase::LevelComplete, events);
    }
}
