//! Read-only views of the session for presentation layers
//!
//! The renderer gets everything needed to draw a frame, including the raw
//! patrol parameters so it can interpolate between ticks. The HUD gets the
//! small set of counters it displays.

use serde::{Deserialize, Serialize};

use crate::game::state::{EntityId, ObstacleKind, Phase, PowerUpKind, SessionId, SessionState};
use crate::maze::{Grid, GridCell};
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: Vec2,
    pub heading: f32,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    pub id: EntityId,
    pub kind: ObstacleKind,
    pub origin: Vec2,
    /// Position at the snapshot's `sim_time`
    pub position: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpSnapshot {
    pub id: EntityId,
    pub kind: PowerUpKind,
    pub position: Vec2,
    pub collected: bool,
}

/// Per-frame state for the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub session_id: SessionId,
    pub sim_time: f32,
    pub grid: Grid,
    pub start: GridCell,
    pub end: GridCell,
    pub player: PlayerSnapshot,
    pub obstacles: Vec<ObstacleSnapshot>,
    pub power_ups: Vec<PowerUpSnapshot>,
    /// Empty unless a map reveal is active
    pub revealed_path: Vec<GridCell>,
}

impl RenderSnapshot {
    pub fn from_session(state: &SessionState) -> Self {
        let t = state.sim_time;
        Self {
            session_id: state.id,
            sim_time: t,
            grid: state.level.grid.clone(),
            start: state.level.start,
            end: state.level.end,
            player: PlayerSnapshot {
                position: state.player.position,
                heading: state.player.heading,
                invulnerable: state.player.is_invulnerable(),
            },
            obstacles: state
                .level
                .obstacles_sorted()
                .into_iter()
                .map(|o| ObstacleSnapshot {
                    id: o.id,
                    kind: o.kind,
                    origin: o.origin,
                    position: o.position_at(t),
                })
                .collect(),
            power_ups: state
                .level
                .power_ups
                .iter()
                .map(|p| PowerUpSnapshot {
                    id: p.id,
                    kind: p.kind,
                    position: p.position,
                    collected: p.collected,
                })
                .collect(),
            revealed_path: state.revealed_path.clone(),
        }
    }
}

/// HUD and radar counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub phase: Phase,
    /// One-based level number for display
    pub level: usize,
    pub lives: u32,
    pub countdown: u32,
    pub paused: bool,
    pub ability_ready: bool,
    pub ability_cooldown: u32,
    pub peeks_remaining: u32,
    pub position: Vec2,
    pub heading: f32,
}

impl HudSnapshot {
    pub fn from_session(state: &SessionState) -> Self {
        Self {
            phase: state.phase,
            level: state.level.index + 1,
            lives: state.lives,
            countdown: state.countdown,
            paused: state.paused,
            ability_ready: state.ability_ready(),
            ability_cooldown: state.ability_cooldown,
            peeks_remaining: state.peeks_remaining,
            position: state.player.position,
            heading: state.player.heading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Axis, Obstacle, PatrolMotion, PowerUp};
    use std::f32::consts::FRAC_PI_2;

    fn create_test_state() -> SessionState {
        let mut state = SessionState::new();
        state.level.grid = Grid::from_ascii("#####\n#S E#\n#####\n").unwrap();
        state.level.start = GridCell::new(1, 1);
        state.level.end = GridCell::new(3, 1);
        state.player.position = Vec2::new(1.0, 1.0);
        state.sim_time = FRAC_PI_2;
        let motion = PatrolMotion {
            axis: Axis::X,
            speed: 1.0,
            range: 0.5,
        };
        state.level.obstacles.insert(4, Obstacle::patrol(4, Vec2::new(2.0, 1.0), motion));
        state.level.obstacles.insert(2, Obstacle::static_spike(2, Vec2::new(3.0, 1.0)));
        state.level.power_ups.push(PowerUp::new(7, Vec2::new(2.0, 1.0), PowerUpKind::ExtraLife));
        state
    }

    #[test]
    fn test_render_snapshot_derives_positions() {
        let state = create_test_state();
        let snapshot = RenderSnapshot::from_session(&state);

        assert_eq!(snapshot.grid.width(), 5);
        assert_eq!(snapshot.obstacles.len(), 2);
        assert_eq!(snapshot.obstacles[0].id, 2);
        assert_eq!(snapshot.obstacles[1].id, 4);
        assert!(snapshot.obstacles[1].position.approx_eq(Vec2::new(2.5, 1.0), 1e-5));
        assert_eq!(snapshot.obstacles[1].origin, Vec2::new(2.0, 1.0));
        assert_eq!(snapshot.power_ups.len(), 1);
        assert!(snapshot.revealed_path.is_empty());
    }

    #[test]
    fn test_hud_snapshot() {
        let mut state = create_test_state();
        state.phase = Phase::Playing;
        state.level.index = 2;
        state.ability_cooldown = 4;
        state.obstacle_in_range = true;

        let hud = HudSnapshot::from_session(&state);
        assert_eq!(hud.level, 3);
        assert_eq!(hud.lives, state.lives);
        assert!(!hud.ability_ready);
        assert_eq!(hud.ability_cooldown, 4);
        assert_eq!(hud.phase, Phase::Playing);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let state = create_test_state();
        let json = serde_json::to_string(&RenderSnapshot::from_session(&state)).unwrap();
        let back: RenderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.grid, state.level.grid);
        assert_eq!(back.end, GridCell::new(3, 1));
    }
}
