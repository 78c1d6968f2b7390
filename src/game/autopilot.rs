//! Route-following input source
//!
//! Turns a list of grid cells into stick input the same way a player would:
//! turn toward the next waypoint, walk once roughly facing it. Used by the
//! headless demo and end-to-end tests.

use crate::game::input_buffer::{InputFrame, Stick};
use crate::game::state::{PlayerState, SessionState};
use crate::maze::{self, GridCell, PathError};
use crate::util::vec2::{wrap_angle, Vec2};

/// Waypoints closer than this count as reached
const ARRIVE_RADIUS: f32 = 0.08;
/// Only walk when the heading error is below this many radians
const WALK_ALIGNMENT: f32 = 0.35;
/// Proportional gain on heading error and remaining distance
const STEER_GAIN: f32 = 4.0;
/// Slowest forward input used while approaching a waypoint
const MIN_FORWARD: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct Autopilot {
    route: Vec<GridCell>,
    next: usize,
}

impl Autopilot {
    pub fn new(route: Vec<GridCell>) -> Self {
        Self { route, next: 0 }
    }

    /// Route from the player's current cell to the level exit
    pub fn for_session(state: &SessionState) -> Result<Self, PathError> {
        let route = maze::shortest_path_between(
            &state.level.grid,
            state.player.position,
            state.level.end.center(),
        )?;
        Ok(Self::new(route))
    }

    /// Input that moves `player` toward the next unreached waypoint
    pub fn steer(&mut self, player: &PlayerState) -> InputFrame {
        while let Some(cell) = self.route.get(self.next) {
            if cell.center().distance_to(player.position) > ARRIVE_RADIUS {
                break;
            }
            self.next += 1;
        }
        let Some(target) = self.route.get(self.next) else {
            return InputFrame::IDLE;
        };

        let to_target = target.center() - player.position;
        let error = wrap_angle(to_target.heading() - player.heading);
        // Heading decreases with positive look input
        let look = Stick::new(-error * STEER_GAIN, 0.0);
        let forward = if error.abs() < WALK_ALIGNMENT {
            (to_target.length() * STEER_GAIN).clamp(MIN_FORWARD, 1.0)
        } else {
            0.0
        };
        InputFrame::new(Stick::new(0.0, forward), look)
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.route.len()
    }

    /// Waypoints not yet reached
    pub fn remaining(&self) -> &[GridCell] {
        &self.route[self.next.min(self.route.len())..]
    }
}
