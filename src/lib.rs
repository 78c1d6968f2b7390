//! Labyrinth simulation core
//!
//! Headless engine for a first-person maze game: perfect-maze generation,
//! spot sampling, shortest-path reveal, continuous collision against the
//! wall grid, and the session state machine that runs levels.
//!
//! Presentation is left to collaborators, which feed [`game::input_buffer::InputFrame`]s
//! in and read [`game::snapshot`] views out.

pub mod config;
pub mod game;
pub mod maze;
pub mod util;
