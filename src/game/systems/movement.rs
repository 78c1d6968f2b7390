use crate::game::constants::player::{INPUT_DEADZONE, ROTATION_SPEED, SPEED};
use crate::game::input_buffer::InputFrame;
use crate::game::state::PlayerState;
use crate::maze::Grid;
use crate::util::vec2::{wrap_angle, Vec2};

use super::collision::{CollisionError, CollisionResolver};

/// Zeroes stick components inside the deadzone
#[inline]
pub fn apply_deadzone(value: f32) -> f32 {
    if value.abs() < INPUT_DEADZONE {
        0.0
    } else {
        value
    }
}

/// Turns the player by the look input. Positive `look.x` turns right.
pub fn apply_rotation(player: &mut PlayerState, input: &InputFrame, dt: f32) {
    player.heading = wrap_angle(player.heading - input.look.x * ROTATION_SPEED * dt);
}

/// World-space displacement for one tick of move input at `heading`.
pub fn displacement(heading: f32, input: &InputFrame, dt: f32) -> Vec2 {
    let forward = apply_deadzone(input.movement.y);
    let strafe = apply_deadzone(input.movement.x);
    if forward == 0.0 && strafe == 0.0 {
        return Vec2::ZERO;
    }
    (Vec2::forward(heading) * forward + Vec2::right(heading) * strafe) * (SPEED * dt)
}

/// Moves the player through the grid, sliding along walls.
///
/// Returns true if the position changed.
pub fn apply_translation(
    player: &mut PlayerState,
    input: &InputFrame,
    grid: &Grid,
    resolver: &CollisionResolver,
    dt: f32,
) -> Result<bool, CollisionError> {
    let delta = displacement(player.heading, input, dt);
    if delta == Vec2::ZERO {
        return Ok(false);
    }
    let resolved = resolver.resolve_move(player.position, delta, grid)?;
    let moved = resolved != player.position;
    player.position = resolved;
    Ok(moved)
}
