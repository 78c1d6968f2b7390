pub mod autopilot;
pub mod constants;
pub mod driver;
pub mod game_loop;
pub mod input_buffer;
pub mod level;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod timers;
