//! Perfect-maze generation
//!
//! Randomized depth-first backtracker over the odd-coordinate lattice.
//! Rooms sit on odd `(x, z)`; the even cell between two adjacent rooms is
//! the wall knocked down to join them. The carve runs on an explicit stack
//! of `(room, remaining directions)` frames, so grid size never limits
//! recursion depth.

use bitvec::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use tracing::debug;

use super::grid::{CellState, Grid, GridCell};
use super::MazeError;

/// Smallest odd dimension that still holds more than one room per axis
pub const MIN_DIMENSION: usize = 5;
/// Largest accepted side length
pub const MAX_DIMENSION: usize = 1001;

/// A freshly carved maze
#[derive(Debug, Clone)]
pub struct GeneratedMaze {
    pub grid: Grid,
    pub start: GridCell,
    pub end: GridCell,
    /// Number of cells opened by the carve (rooms plus knocked-down walls)
    pub carved: usize,
}

/// Step-2 moves between neighbouring rooms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    North,
    South,
    East,
    West,
}

impl Step {
    const ALL: [Step; 4] = [Step::North, Step::South, Step::East, Step::West];

    fn delta(self) -> (isize, isize) {
        match self {
            Step::North => (0, -1),
            Step::South => (0, 1),
            Step::East => (1, 0),
            Step::West => (-1, 0),
        }
    }
}

/// One level of the carve: the room being expanded and the directions
/// it has not tried yet.
struct Frame {
    room: GridCell,
    remaining: SmallVec<[Step; 4]>,
}

impl Frame {
    fn new<R: Rng + ?Sized>(room: GridCell, rng: &mut R) -> Self {
        let mut remaining = SmallVec::from_buf(Step::ALL);
        remaining.shuffle(rng);
        Self { room, remaining }
    }
}

/// Generates a maze using the thread-local RNG.
pub fn generate(width: usize, height: usize) -> Result<GeneratedMaze, MazeError> {
    generate_with_rng(width, height, &mut rand::thread_rng())
}

/// Generates a reproducible maze from a seed.
pub fn generate_from_seed(width: usize, height: usize, seed: u64) -> Result<GeneratedMaze, MazeError> {
    generate_with_rng(width, height, &mut StdRng::seed_from_u64(seed))
}

/// Generates a maze drawing randomness from `rng`.
///
/// Both dimensions must be odd and within [`MIN_DIMENSION`] and
/// [`MAX_DIMENSION`]. The start
/// is always `(1, 1)`; the end is the first non-wall cell found walking
/// from `(width - 2, height - 2)` toward the start, x before z.
pub fn generate_with_rng<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    rng: &mut R,
) -> Result<GeneratedMaze, MazeError> {
    let valid = |side: usize| (MIN_DIMENSION..=MAX_DIMENSION).contains(&side) && side % 2 == 1;
    if !valid(width) || !valid(height) {
        return Err(MazeError::InvalidDimensions {
            width,
            height,
            min: MIN_DIMENSION,
            max: MAX_DIMENSION,
        });
    }

    let mut grid = Grid::filled(width, height, CellState::Wall);
    let rooms_x = (width - 1) / 2;
    let rooms_z = (height - 1) / 2;
    let room_index = |room: GridCell| (room.z / 2) * rooms_x + room.x / 2;

    let mut visited = bitvec![0; rooms_x * rooms_z];
    let start = GridCell::new(1, 1);
    grid.set(start, CellState::Path);
    visited.set(room_index(start), true);
    let mut carved = 1;

    let mut stack = vec![Frame::new(start, rng)];
    loop {
        let next_step = match stack.last_mut() {
            Some(frame) => frame.remaining.pop().map(|step| (frame.room, step)),
            None => break,
        };
        let Some((room, step)) = next_step else {
            stack.pop();
            continue;
        };

        let (dx, dz) = step.delta();
        let Some(next) = room.offset(dx * 2, dz * 2) else {
            continue;
        };
        // rooms live strictly inside the border
        if next.x == 0 || next.z == 0 || next.x >= width - 1 || next.z >= height - 1 {
            continue;
        }
        if visited[room_index(next)] {
            continue;
        }

        if let Some(wall) = room.offset(dx, dz) {
            grid.set(wall, CellState::Path);
            carved += 1;
        }
        grid.set(next, CellState::Path);
        visited.set(room_index(next), true);
        carved += 1;
        stack.push(Frame::new(next, rng));
    }

    let mut end = GridCell::new(width - 2, height - 2);
    while grid.get(end) == Some(CellState::Wall) && (end.x > 1 || end.z > 1) {
        if end.x > 1 {
            end.x -= 1;
        } else {
            end.z -= 1;
        }
    }

    grid.set(start, CellState::Start);
    grid.set(end, CellState::End);

    debug!(
        "Generated {}x{} maze: {} cells carved, end at {}",
        width, height, carved, end
    );

    Ok(GeneratedMaze {
        grid,
        start,
        end,
        carved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;
    use std::collections::VecDeque;

    fn reachable_from(grid: &Grid, start: GridCell) -> HashSet<GridCell> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(cell) = queue.pop_front() {
            for next in grid.walkable_neighbors(cell) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn test_rejects_invalid_dimensions() {
        for (w, h) in [
            (4, 7),
            (7, 4),
            (3, 3),
            (6, 6),
            (1, 9),
            (0, 0),
            (MAX_DIMENSION + 2, 7),
            (7, usize::MAX),
        ] {
            let result = generate_from_seed(w, h, 1);
            assert!(
                matches!(result, Err(MazeError::InvalidDimensions { .. })),
                "{w}x{h} should be rejected"
            );
        }
    }

    #[test]
    fn test_start_and_end_markers() {
        let maze = generate_from_seed(11, 9, 42).unwrap();
        assert_eq!(maze.start, GridCell::new(1, 1));
        assert_eq!(maze.grid.get(maze.start), Some(CellState::Start));
        assert_eq!(maze.grid.get(maze.end), Some(CellState::End));
        assert_ne!(maze.start, maze.end);

        let starts = maze.grid.cells().filter(|&(_, s)| s == CellState::Start).count();
        let ends = maze.grid.cells().filter(|&(_, s)| s == CellState::End).count();
        assert_eq!(starts, 1);
        assert_eq!(ends, 1);
    }

    #[test]
    fn test_end_lands_on_far_corner_room() {
        // every odd room is carved, so the far corner is always open
        for seed in 0..10 {
            let maze = generate_from_seed(9, 7, seed).unwrap();
            assert_eq!(maze.end, GridCell::new(7, 5));
        }
    }

    #[test]
    fn test_border_is_wall() {
        let maze = generate_from_seed(13, 11, 7).unwrap();
        let grid = &maze.grid;
        for x in 0..grid.width() {
            assert_eq!(grid.get(GridCell::new(x, 0)), Some(CellState::Wall));
            assert_eq!(grid.get(GridCell::new(x, grid.height() - 1)), Some(CellState::Wall));
        }
        for z in 0..grid.height() {
            assert_eq!(grid.get(GridCell::new(0, z)), Some(CellState::Wall));
            assert_eq!(grid.get(GridCell::new(grid.width() - 1, z)), Some(CellState::Wall));
        }
    }

    #[test]
    fn test_even_even_cells_stay_walls() {
        let maze = generate_from_seed(15, 15, 3).unwrap();
        for (cell, state) in maze.grid.cells() {
            if cell.x % 2 == 0 && cell.z % 2 == 0 {
                assert_eq!(state, CellState::Wall, "pillar at {cell} was carved");
            }
        }
    }

    #[test]
    fn test_spanning_tree_property() {
        for seed in 0..20 {
            for (w, h) in [(5, 5), (7, 7), (11, 9), (21, 15)] {
                let maze = generate_from_seed(w, h, seed).unwrap();
                let rooms = ((w - 1) / 2) * ((h - 1) / 2);
                let walkable = maze.grid.walkable_count();

                // every carve opened exactly the cells that are now walkable
                assert_eq!(walkable, maze.carved);
                // a tree over `rooms` nodes has `rooms - 1` connecting walls
                assert_eq!(walkable, 2 * rooms - 1);
                // and BFS from the start visits all of them
                assert_eq!(reachable_from(&maze.grid, maze.start).len(), walkable);
            }
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = generate_from_seed(21, 21, 99).unwrap();
        let b = generate_from_seed(21, 21, 99).unwrap();
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn test_large_maze_does_not_overflow_stack() {
        let maze = generate_from_seed(401, 401, 5).unwrap();
        assert_eq!(maze.carved, 2 * 200 * 200 - 1);
    }

    #[test]
    fn test_thread_rng_generation() {
        let maze = generate(7, 7).unwrap();
        assert_eq!(maze.grid.width(), 7);
        assert_eq!(reachable_from(&maze.grid, maze.start).len(), maze.carved);
    }
}
