//! Maze grid, generation and navigation queries
//!
//! Everything here is pure data and synchronous algorithms: the session
//! layer in [`crate::game`] owns the grids produced here and calls into the
//! sampler and path finder while building and playing a level.

pub mod generator;
pub mod grid;
pub mod pathfinding;
pub mod sampler;

pub use generator::{
    generate, generate_from_seed, generate_with_rng, GeneratedMaze, MAX_DIMENSION, MIN_DIMENSION,
};
pub use grid::{CellState, Grid, GridCell};
pub use pathfinding::{shortest_path, shortest_path_between, PathError};
pub use sampler::{sample_spots, MAX_SAMPLE_ATTEMPTS, START_EXCLUSION};

/// Errors raised while building or parsing a grid
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error("maze dimensions must be odd and between {min} and {max}, got {width}x{height}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        min: usize,
        max: usize,
    },

    #[error("maze layout is empty")]
    EmptyLayout,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unknown cell symbol '{symbol}' at ({x}, {z})")]
    UnknownSymbol { symbol: char, x: usize, z: usize },
}
