//! Obstacle proximity and the area-clear ability
//!
//! Obstacle positions are always derived from the session clock at the
//! moment of the query, so the check that enables the ability and the
//! ability itself agree on where every patrol is.

use hashbrown::HashMap;

use crate::game::constants::hazard::{ABILITY_RANGE, HIT_RADIUS};
use crate::game::state::{EntityId, Obstacle};
use crate::util::vec2::Vec2;

/// Result of scanning obstacles around the player
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HazardScan {
    /// Some obstacle is within ability range
    pub in_ability_range: bool,
    /// Closest obstacle within hit radius, if any
    pub hit: Option<EntityId>,
}

/// Scans every obstacle at simulation time `t`.
pub fn scan(obstacles: &HashMap<EntityId, Obstacle>, player: Vec2, t: f32) -> HazardScan {
    let range_sq = ABILITY_RANGE * ABILITY_RANGE;
    let hit_sq = HIT_RADIUS * HIT_RADIUS;

    let mut result = HazardScan::default();
    let mut closest_hit = f32::MAX;
    for obstacle in obstacles.values() {
        let dist_sq = obstacle.position_at(t).distance_sq_to(player);
        if dist_sq < range_sq {
            result.in_ability_range = true;
        }
        if dist_sq < hit_sq && dist_sq < closest_hit {
            closest_hit = dist_sq;
            result.hit = Some(obstacle.id);
        }
    }
    result
}

/// Removes every obstacle within ability range of `player` at time `t`.
///
/// Returns the removed ids in ascending order.
pub fn clear_area(obstacles: &mut HashMap<EntityId, Obstacle>, player: Vec2, t: f32) -> Vec<EntityId> {
    let range_sq = ABILITY_RANGE * ABILITY_RANGE;
    let mut removed: Vec<EntityId> = obstacles
        .values()
        .filter(|o| o.position_at(t).distance_sq_to(player) < range_sq)
        .map(|o| o.id)
        .collect();
    removed.sort_unstable();
    for id in &removed {
        obstacles.remove(id);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Axis, PatrolMotion};
    use std::f32::consts::FRAC_PI_2;

    fn obstacles(list: Vec<Obstacle>) -> HashMap<EntityId, Obstacle> {
        list.into_iter().map(|o| (o.id, o)).collect()
    }

    #[test]
    fn test_scan_empty() {
        let scan = scan(&HashMap::new(), Vec2::ZERO, 0.0);
        assert_eq!(scan, HazardScan::default());
    }

    #[test]
    fn test_scan_range_and_hit() {
        let player = Vec2::new(5.0, 5.0);
        let set = obstacles(vec![
            Obstacle::static_spike(1, Vec2::new(7.0, 5.0)),
            Obstacle::static_spike(2, Vec2::new(5.3, 5.0)),
            Obstacle::static_spike(3, Vec2::new(5.0, 5.1)),
        ]);
        let scan = scan(&set, player, 0.0);
        assert!(scan.in_ability_range);
        assert_eq!(scan.hit, Some(3));
    }

    #[test]
    fn test_scan_out_of_range() {
        let set = obstacles(vec![Obstacle::static_spike(1, Vec2::new(9.0, 9.0))]);
        let scan = scan(&set, Vec2::new(1.0, 1.0), 0.0);
        assert!(!scan.in_ability_range);
        assert!(scan.hit.is_none());
    }

    #[test]
    fn test_patrol_hits_only_when_swinging_in() {
        let motion = PatrolMotion {
            axis: Axis::X,
            speed: 1.0,
            range: 1.0,
        };
        let set = obstacles(vec![Obstacle::patrol(1, Vec2::new(4.0, 3.0), motion)]);
        let player = Vec2::new(5.0, 3.0);

        assert!(scan(&set, player, 0.0).hit.is_none());
        assert_eq!(scan(&set, player, FRAC_PI_2).hit, Some(1));
    }

    #[test]
    fn test_clear_area_uses_live_positions() {
        let motion = PatrolMotion {
            axis: Axis::Z,
            speed: 1.0,
            range: 2.0,
        };
        let mut set = obstacles(vec![
            Obstacle::patrol(1, Vec2::new(1.0, 5.0), motion),
            Obstacle::static_spike(2, Vec2::new(1.0, 2.0)),
            Obstacle::static_spike(3, Vec2::new(8.0, 8.0)),
        ]);
        let player = Vec2::new(1.0, 1.0);

        // at t = 0 the patrol sits at z = 5, out of range
        let removed = clear_area(&mut set, player, 0.0);
        assert_eq!(removed, vec![2]);

        // a quarter period back it has swung to z = 3
        let removed = clear_area(&mut set, player, -FRAC_PI_2);
        assert_eq!(removed, vec![1]);
        assert_eq!(set.len(), 1);
        assert!(set.contains_key(&3));
    }
}
