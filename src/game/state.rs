//! Session state definitions
//!
//! Contains the player, the active level (grid, obstacles, power-ups) and
//! the counters the session state machine runs on.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::constants::session;
use crate::game::timers::{Scheduler, TimerToken};
use crate::maze::{Grid, GridCell};
use crate::util::vec2::Vec2;

/// Unique session identifier
pub type SessionId = Uuid;

/// Identifier for obstacles and power-ups, unique within a session
pub type EntityId = u64;

/// Session state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Waiting for a game to start
    #[default]
    Menu,
    /// Full-map preview before play, counts down
    Memorize,
    /// Player is moving through the maze
    Playing,
    /// Temporary map preview during play, counts down
    MapPeek,
    /// End reached, waiting to proceed
    LevelComplete,
    /// Out of lives
    GameOver,
}

impl Phase {
    /// Phases that run on a countdown and return to play when it hits zero
    pub fn has_countdown(self) -> bool {
        matches!(self, Phase::Memorize | Phase::MapPeek)
    }

    /// Phases during which a level exists and a driver should be running
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Phase::Memorize | Phase::Playing | Phase::MapPeek | Phase::LevelComplete
        )
    }
}

/// Horizontal axis a patrol oscillates along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec2 {
        match self {
            Axis::X => Vec2::EAST,
            Axis::Z => Vec2::SOUTH,
        }
    }
}

/// Sinusoidal patrol parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatrolMotion {
    pub axis: Axis,
    /// Phase speed in radians per second
    pub speed: f32,
    /// Amplitude in grid units
    pub range: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    StaticSpike,
    PatrolEnemy(PatrolMotion),
}

/// A hazard. Its live position is derived from `origin`, its motion and
/// the simulation time; it is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub origin: Vec2,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn static_spike(id: EntityId, origin: Vec2) -> Self {
        Self {
            id,
            origin,
            kind: ObstacleKind::StaticSpike,
        }
    }

    pub fn patrol(id: EntityId, origin: Vec2, motion: PatrolMotion) -> Self {
        Self {
            id,
            origin,
            kind: ObstacleKind::PatrolEnemy(motion),
        }
    }

    /// Position at simulation time `t` seconds
    pub fn position_at(&self, t: f32) -> Vec2 {
        match self.kind {
            ObstacleKind::StaticSpike => self.origin,
            ObstacleKind::PatrolEnemy(motion) => {
                self.origin + motion.axis.unit() * ((t * motion.speed).sin() * motion.range)
            }
        }
    }

    pub fn is_patrol(&self) -> bool {
        matches!(self.kind, ObstacleKind::PatrolEnemy(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Shows the shortest route to the exit for a while
    MapReveal,
    /// Adds a life
    ExtraLife,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub position: Vec2,
    pub kind: PowerUpKind,
    /// Flips to true once; collected items stay in the level
    pub collected: bool,
}

impl PowerUp {
    pub fn new(id: EntityId, position: Vec2, kind: PowerUpKind) -> Self {
        Self {
            id,
            position,
            kind,
            collected: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec2,
    /// Yaw in radians; 0 faces north (-z)
    pub heading: f32,
    /// Pending end of the current invulnerability window
    pub invulnerability: Option<TimerToken>,
}

impl PlayerState {
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self {
            position,
            heading,
            invulnerability: None,
        }
    }

    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerability.is_some()
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }
}

/// Everything that belongs to one level; replaced wholesale on level start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveLevel {
    pub index: usize,
    pub grid: Grid,
    pub start: GridCell,
    pub end: GridCell,
    /// Heading the player spawns with, facing the first open corridor
    pub start_heading: f32,
    pub obstacles: HashMap<EntityId, Obstacle>,
    pub power_ups: Vec<PowerUp>,
    /// Countdown length for the memorize phase
    pub memorize_secs: u32,
}

impl ActiveLevel {
    /// Placeholder used before the first level is built
    pub fn empty() -> Self {
        Self {
            index: 0,
            grid: Grid::empty(),
            start: GridCell::default(),
            end: GridCell::default(),
            start_heading: 0.0,
            obstacles: HashMap::new(),
            power_ups: Vec::new(),
            memorize_secs: 0,
        }
    }

    /// Obstacles in id order, so iteration is deterministic
    pub fn obstacles_sorted(&self) -> Vec<&Obstacle> {
        let mut obstacles: Vec<&Obstacle> = self.obstacles.values().collect();
        obstacles.sort_by_key(|o| o.id);
        obstacles
    }

    pub fn remaining_power_ups(&self) -> usize {
        self.power_ups.iter().filter(|p| !p.collected).count()
    }
}

impl Default for ActiveLevel {
    fn default() -> Self {
        Self::empty()
    }
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: SessionId,
    pub phase: Phase,
    pub lives: u32,
    /// Seconds left in the memorize or map-peek countdown
    pub countdown: u32,
    pub paused: bool,
    /// Whole seconds until the area-clear ability can be used again
    pub ability_cooldown: u32,
    /// Set by the last tick when an obstacle was within ability range
    pub obstacle_in_range: bool,
    pub peeks_remaining: u32,
    /// Seconds of play on the current level; the single clock for patrol
    /// motion, ability checks and timed effects
    pub sim_time: f32,
    pub player: PlayerState,
    pub level: ActiveLevel,
    /// Route staged by a map reveal; empty when inactive
    pub revealed_path: Vec<GridCell>,
    pub reveal_expiry: Option<TimerToken>,
    pub timers: Scheduler,
    next_entity_id: EntityId,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Menu,
            lives: session::STARTING_LIVES,
            countdown: 0,
            paused: false,
            ability_cooldown: 0,
            obstacle_in_range: false,
            peeks_remaining: 0,
            sim_time: 0.0,
            player: PlayerState::default(),
            level: ActiveLevel::empty(),
            revealed_path: Vec::new(),
            reveal_expiry: None,
            timers: Scheduler::new(),
            next_entity_id: 1,
        }
    }

    /// Generate a new unique entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Ability is usable: an obstacle was in range on the last tick and the
    /// cooldown has run out.
    pub fn ability_ready(&self) -> bool {
        self.obstacle_in_range && self.ability_cooldown == 0
    }

    /// Whether the update loop should integrate this frame
    pub fn is_simulating(&self) -> bool {
        self.phase == Phase::Playing && !self.paused
    }

    /// Live positions of every obstacle at the current simulation time
    pub fn obstacle_positions(&self) -> impl Iterator<Item = (EntityId, Vec2)> + '_ {
        let t = self.sim_time;
        self.level
            .obstacles
            .values()
            .map(move |o| (o.id, o.position_at(t)))
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_static_obstacle_never_moves() {
        let spike = Obstacle::static_spike(1, Vec2::new(3.0, 5.0));
        for t in [0.0, 0.5, 17.0, 1000.0] {
            assert_eq!(spike.position_at(t), Vec2::new(3.0, 5.0));
        }
        assert!(!spike.is_patrol());
    }

    #[test]
    fn test_patrol_oscillates_along_axis() {
        let motion = PatrolMotion {
            axis: Axis::Z,
            speed: 1.0,
            range: 0.8,
        };
        let patrol = Obstacle::patrol(2, Vec2::new(3.0, 5.0), motion);
        assert!(patrol.position_at(0.0).approx_eq(Vec2::new(3.0, 5.0), 1e-5));
        assert!(patrol.position_at(FRAC_PI_2).approx_eq(Vec2::new(3.0, 5.8), 1e-5));
        assert!(patrol.position_at(3.0 * FRAC_PI_2).approx_eq(Vec2::new(3.0, 4.2), 1e-5));
        for step in 0..100 {
            let p = patrol.position_at(step as f32 * 0.13);
            assert_eq!(p.x, 3.0);
            assert!((p.z - 5.0).abs() <= 0.8 + 1e-5);
        }
    }

    #[test]
    fn test_phase_helpers() {
        assert!(Phase::Memorize.has_countdown());
        assert!(Phase::MapPeek.has_countdown());
        assert!(!Phase::Playing.has_countdown());
        assert!(Phase::LevelComplete.is_active());
        assert!(!Phase::Menu.is_active());
        assert!(!Phase::GameOver.is_active());
        assert_eq!(Phase::default(), Phase::Menu);
    }

    #[test]
    fn test_new_session() {
        let mut state = SessionState::new();
        assert_eq!(state.phase, Phase::Menu);
        assert_eq!(state.lives, session::STARTING_LIVES);
        assert!(!state.ability_ready());
        assert!(!state.is_simulating());
        assert_eq!(state.next_entity_id(), 1);
        assert_eq!(state.next_entity_id(), 2);
    }

    #[test]
    fn test_ability_ready_needs_range_and_cooldown() {
        let mut state = SessionState::new();
        state.obstacle_in_range = true;
        assert!(state.ability_ready());
        state.ability_cooldown = 4;
        assert!(!state.ability_ready());
    }

    #[test]
    fn test_obstacles_sorted() {
        let mut level = ActiveLevel::empty();
        for id in [5, 2, 9] {
            level.obstacles.insert(id, Obstacle::static_spike(id, Vec2::ZERO));
        }
        let ids: Vec<_> = level.obstacles_sorted().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
