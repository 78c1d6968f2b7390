use smallvec::SmallVec;

use crate::game::constants::power_up::PICKUP_RADIUS;
use crate::game::state::{EntityId, PowerUp, PowerUpKind};
use crate::util::vec2::Vec2;

/// Marks every uncollected power-up within pickup radius as collected
/// and returns what was picked up, in collection order.
pub fn collect(power_ups: &mut [PowerUp], player: Vec2) -> SmallVec<[(EntityId, PowerUpKind); 2]> {
    let radius_sq = PICKUP_RADIUS * PICKUP_RADIUS;
    power_ups
        .iter_mut()
        .filter(|p| !p.collected && p.position.distance_sq_to(player) < radius_sq)
        .map(|p| {
            p.collected = true;
            (p.id, p.kind)
        })
        .collect()
}
