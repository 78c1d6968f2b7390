/// Player movement and footprint
pub mod player {
    /// Radius of the player's collision footprint in grid units
    pub const RADIUS: f32 = 0.2;
    /// Extra margin added when choosing which cells to test
    pub const COLLISION_MARGIN: f32 = 0.05;
    /// Walk speed in grid units per second
    pub const SPEED: f32 = 3.0;
    /// Turn rate in radians per second at full look input
    pub const ROTATION_SPEED: f32 = 2.5;
    /// Move input components below this magnitude are ignored
    pub const INPUT_DEADZONE: f32 = 0.1;
}

/// Hazard placement and behaviour
pub mod hazard {
    /// Obstacles closer than this hit the player
    pub const HIT_RADIUS: f32 = 0.45;
    /// Obstacles closer than this can be removed by the area-clear ability
    pub const ABILITY_RANGE: f32 = 2.5;
    /// Patrol oscillation speed range (radians of phase per second)
    pub const PATROL_SPEED_MIN: f32 = 1.0;
    pub const PATROL_SPEED_MAX: f32 = 2.5;
    /// Patrol amplitude in grid units
    pub const PATROL_RANGE: f32 = 0.8;
}

/// Power-up placement and effects
pub mod power_up {
    /// Power-ups closer than this are collected
    pub const PICKUP_RADIUS: f32 = 0.5;
    /// Probability that a spawned power-up is a map reveal (else extra life)
    pub const MAP_REVEAL_CHANCE: f64 = 0.6;
    /// How long a revealed path stays visible, in seconds of play
    pub const REVEAL_DURATION: f32 = 6.0;
    /// Spots sampled beyond the obstacle count so power-ups always get room
    pub const EXTRA_SPOTS: usize = 2;
}

/// Session rules
pub mod session {
    /// Lives at the start of a new game
    pub const STARTING_LIVES: u32 = 3;
    /// Invulnerability window after a hit, in seconds of play
    pub const INVULNERABILITY_DURATION: f32 = 2.0;
    /// Area-clear cooldown in whole seconds
    pub const ABILITY_COOLDOWN_SECS: u32 = 10;
    /// Map peek countdown in whole seconds
    pub const PEEK_SECS: u32 = 3;
    /// Map peeks granted at the start of each level
    pub const PEEKS_PER_LEVEL: u32 = 1;
    /// Distance to the end cell centre that completes the level
    pub const WIN_DISTANCE: f32 = 0.5;
    /// Largest frame delta the tick will integrate (frame hitch guard)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Level table growth
pub mod level {
    /// Size added per level once the level table runs out
    pub const SIZE_STEP: usize = 2;
}

/// Driver pacing
pub mod timing {
    /// Default simulation frame rate in Hz
    pub const FRAME_RATE: u32 = 60;
    /// Default frame delta in seconds
    pub const FRAME_DT: f32 = 1.0 / FRAME_RATE as f32;
    /// Countdown resolution in milliseconds
    pub const COUNTDOWN_INTERVAL_MS: u64 = 1000;
}
