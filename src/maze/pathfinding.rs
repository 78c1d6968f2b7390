//! Breadth-first shortest paths over walkable cells

use hashbrown::HashMap;
use std::collections::VecDeque;

use super::grid::{Grid, GridCell};
use crate::util::Vec2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("cell {cell} is outside the {width}x{height} grid")]
    OutOfBounds {
        cell: GridCell,
        width: usize,
        height: usize,
    },

    #[error("position ({x}, {z}) does not map to a grid cell")]
    InvalidPosition { x: f32, z: f32 },
}

fn check_bounds(grid: &Grid, cell: GridCell) -> Result<(), PathError> {
    if grid.contains(cell) {
        Ok(())
    } else {
        Err(PathError::OutOfBounds {
            cell,
            width: grid.width(),
            height: grid.height(),
        })
    }
}

fn cell_at(grid: &Grid, position: Vec2) -> Result<GridCell, PathError> {
    let cell = GridCell::containing(position).ok_or(PathError::InvalidPosition {
        x: position.x,
        z: position.z,
    })?;
    check_bounds(grid, cell)?;
    Ok(cell)
}

/// Shortest 4-connected route from `start` to `end`, both inclusive.
///
/// Walls are impassable; Start, End and Path cells are all walkable.
/// Returns an empty route when `end` cannot be reached, including when
/// either endpoint is itself a wall.
pub fn shortest_path(grid: &Grid, start: GridCell, end: GridCell) -> Result<Vec<GridCell>, PathError> {
    check_bounds(grid, start)?;
    check_bounds(grid, end)?;

    if !grid.is_walkable(start) || !grid.is_walkable(end) {
        return Ok(Vec::new());
    }
    if start == end {
        return Ok(vec![start]);
    }

    // cell -> the cell it was first reached from
    let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    came_from.insert(start, start);

    while let Some(cell) = queue.pop_front() {
        if cell == end {
            break;
        }
        for next in grid.walkable_neighbors(cell) {
            if !came_from.contains_key(&next) {
                came_from.insert(next, cell);
                queue.push_back(next);
            }
        }
    }

    if !came_from.contains_key(&end) {
        return Ok(Vec::new());
    }

    let mut route = vec![end];
    let mut cursor = end;
    while cursor != start {
        match came_from.get(&cursor) {
            Some(&prev) => {
                route.push(prev);
                cursor = prev;
            }
            None => return Ok(Vec::new()),
        }
    }
    route.reverse();
    Ok(route)
}

/// [`shortest_path`] between two continuous positions, each mapped to
/// the cell that contains it.
pub fn shortest_path_between(grid: &Grid, from: Vec2, to: Vec2) -> Result<Vec<GridCell>, PathError> {
    let start = cell_at(grid, from)?;
    let end = cell_at(grid, to)?;
    shortest_path(grid, start, end)
}
