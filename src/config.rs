use std::str::FromStr;

use crate::game::constants::{session, timing};

/// Simulation runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Frame driver rate in Hz
    pub frame_rate: u32,
    /// Lives granted by `start_game`
    pub starting_lives: u32,
    /// Zero-based level a new game starts on
    pub start_level: usize,
    /// Fixed RNG seed for reproducible mazes; random when unset
    pub seed: Option<u64>,
    /// Input frames that can queue between two ticks
    pub input_capacity: usize,
    /// Levels the headless demo plays before exiting
    pub demo_levels: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frame_rate: timing::FRAME_RATE,
            starting_lives: session::STARTING_LIVES,
            start_level: 0,
            seed: None,
            input_capacity: 64,
            demo_levels: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("frame_rate must be 1-240, got {0}")]
    FrameRate(u32),
    #[error("starting_lives must be at least 1")]
    NoLives,
    #[error("input_capacity must be at least 1")]
    NoInputCapacity,
}

/// Parses `name` if set, keeping `current` on missing or rejected values.
fn parse_var<T, F>(lookup: &F, name: &str, current: T, accept: impl Fn(&T) -> bool) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return current;
    };
    match raw.trim().parse::<T>() {
        Ok(parsed) if accept(&parsed) => parsed,
        Ok(_) => {
            tracing::warn!("{} '{}' is out of range, using default", name, raw);
            current
        }
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", name, raw);
            current
        }
    }
}

impl SimConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        Self::load_from(|name| std::env::var(name).ok())
    }

    /// Load config from an arbitrary variable source
    pub fn load_from<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            frame_rate: parse_var(&lookup, "MAZE_FRAME_RATE", defaults.frame_rate, |v| {
                (1..=240).contains(v)
            }),
            starting_lives: parse_var(&lookup, "MAZE_STARTING_LIVES", defaults.starting_lives, |v| {
                *v > 0
            }),
            start_level: parse_var(&lookup, "MAZE_START_LEVEL", defaults.start_level, |v| *v < 1000),
            seed: lookup("MAZE_SEED").and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(seed) => Some(seed),
                Err(_) => {
                    tracing::warn!("Invalid MAZE_SEED '{}', using a random seed", raw);
                    None
                }
            }),
            input_capacity: parse_var(&lookup, "MAZE_INPUT_CAPACITY", defaults.input_capacity, |v| {
                *v > 0
            }),
            demo_levels: parse_var(&lookup, "MAZE_DEMO_LEVELS", defaults.demo_levels, |v| *v > 0),
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate == 0 || self.frame_rate > 240 {
            return Err(ConfigError::FrameRate(self.frame_rate));
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if self.input_capacity == 0 {
            return Err(ConfigError::NoInputCapacity);
        }
        Ok(())
    }

    /// Nominal seconds per frame at `frame_rate`
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }
}
