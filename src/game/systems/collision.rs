//! Player footprint vs wall grid
//!
//! The circular footprint is approximated by its bounding box and tested
//! against the unit square of every wall cell it could touch. Movement is
//! resolved one axis at a time so the player slides along walls.

use crate::game::constants::player;
use crate::maze::{CellState, Grid, GridCell};
use crate::util::vec2::Vec2;

/// Axis-aligned box on the ground plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square box of the given half extent around `center`
    pub fn around(center: Vec2, half_extent: f32) -> Self {
        let half = Vec2::new(half_extent, half_extent);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn inflate(&self, margin: f32) -> Self {
        let m = Vec2::new(margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Strict overlap; boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollisionError {
    #[error("position ({x}, {z}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: f32,
        z: f32,
        width: usize,
        height: usize,
    },
}

/// Footprint collision query against a [`Grid`]
#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    pub radius: f32,
    pub margin: f32,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(player::RADIUS, player::COLLISION_MARGIN)
    }
}

impl CollisionResolver {
    pub fn new(radius: f32, margin: f32) -> Self {
        Self { radius, margin }
    }

    /// True if the footprint centred at `position` overlaps a wall.
    ///
    /// `position` must lie on the grid; anything else is a caller bug and
    /// returns [`CollisionError::OutOfBounds`].
    pub fn blocked(&self, position: Vec2, grid: &Grid) -> Result<bool, CollisionError> {
        self.check_bounds(position, grid)?;
        Ok(self.overlaps_wall(position, grid))
    }

    /// Moves by `delta`, committing X from the current Z first and then Z
    /// from the possibly updated X. A blocked axis is dropped, the other
    /// still applies.
    pub fn resolve_move(&self, position: Vec2, delta: Vec2, grid: &Grid) -> Result<Vec2, CollisionError> {
        self.check_bounds(position, grid)?;
        let mut resolved = position;

        if delta.x != 0.0 {
            let candidate = Vec2::new(resolved.x + delta.x, resolved.z);
            if !self.overlaps_wall(candidate, grid) {
                resolved.x = candidate.x;
            }
        }
        if delta.z != 0.0 {
            let candidate = Vec2::new(resolved.x, resolved.z + delta.z);
            if !self.overlaps_wall(candidate, grid) {
                resolved.z = candidate.z;
            }
        }

        Ok(resolved)
    }

    fn check_bounds(&self, position: Vec2, grid: &Grid) -> Result<(), CollisionError> {
        let inside = position.is_finite()
            && position.x >= -0.5
            && position.z >= -0.5
            && position.x < grid.width() as f32 - 0.5
            && position.z < grid.height() as f32 - 0.5;
        if inside {
            Ok(())
        } else {
            Err(CollisionError::OutOfBounds {
                x: position.x,
                z: position.z,
                width: grid.width(),
                height: grid.height(),
            })
        }
    }

    /// Cells beyond the grid edge count as solid.
    fn overlaps_wall(&self, position: Vec2, grid: &Grid) -> bool {
        if !position.is_finite() {
            return true;
        }
        let footprint = Aabb::around(position, self.radius);
        let probe = footprint.inflate(self.margin);

        let min_x = (probe.min.x + 0.5).floor() as i64;
        let max_x = (probe.max.x + 0.5).floor() as i64;
        let min_z = (probe.min.z + 0.5).floor() as i64;
        let max_z = (probe.max.z + 0.5).floor() as i64;

        for z in min_z..=max_z {
            for x in min_x..=max_x {
                let solid = if x < 0 || z < 0 {
                    true
                } else {
                    grid.get(GridCell::new(x as usize, z as usize))
                        .map_or(true, |state| state == CellState::Wall)
                };
                if !solid {
                    continue;
                }
                let cell = Aabb::around(Vec2::new(x as f32, z as f32), 0.5);
                if footprint.intersects(&cell) {
                    return true;
                }
            }
        }
        false
    }
}
