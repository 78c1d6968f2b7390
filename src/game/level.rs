//! Level table and level construction
//!
//! A level is built in one go: carve the maze, face the player down the
//! first open corridor, then scatter obstacles and power-ups over sampled
//! path cells away from the start.

use hashbrown::HashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};
use tracing::info;

use crate::game::constants::{hazard, level, power_up};
use crate::game::state::{ActiveLevel, Axis, Obstacle, PatrolMotion, PowerUp, PowerUpKind, SessionState};
use crate::maze::{self, Grid, GridCell, MazeError};

/// Difficulty settings for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Odd side length of the square maze
    pub size: usize,
    pub obstacle_count: usize,
    /// Every other obstacle patrols when set
    pub moving_obstacles: bool,
    pub memorize_secs: u32,
}

impl LevelConfig {
    const fn new(size: usize, obstacle_count: usize, moving_obstacles: bool, memorize_secs: u32) -> Self {
        Self {
            size,
            obstacle_count,
            moving_obstacles,
            memorize_secs,
        }
    }

    /// Config for a zero-based level index.
    ///
    /// Past the end of [`LEVEL_TABLE`] the last entry is reused with its
    /// size grown by [`level::SIZE_STEP`] per extra level. The size
    /// saturates rather than overflowing; anything past
    /// [`maze::MAX_DIMENSION`] is rejected by [`build_level`].
    pub fn for_index(index: usize) -> Self {
        match LEVEL_TABLE.get(index) {
            Some(config) => *config,
            None => {
                let last_index = LEVEL_TABLE.len() - 1;
                let last = LEVEL_TABLE[last_index];
                let growth = level::SIZE_STEP.saturating_mul(index - last_index);
                Self {
                    size: last.size.saturating_add(growth),
                    ..last
                }
            }
        }
    }
}

pub const LEVEL_TABLE: [LevelConfig; 5] = [
    LevelConfig::new(7, 1, false, 5),
    LevelConfig::new(9, 2, false, 6),
    LevelConfig::new(11, 4, true, 7),
    LevelConfig::new(13, 6, true, 8),
    LevelConfig::new(15, 8, true, 9),
];

/// Facing for each cardinal neighbour, in the order they are tried
const FACINGS: [((isize, isize), f32); 4] = [
    ((0, -1), 0.0),        // north
    ((0, 1), PI),          // south
    ((1, 0), -FRAC_PI_2),  // east
    ((-1, 0), FRAC_PI_2),  // west
];

/// Heading toward the first walkable neighbour of `start`, trying north,
/// south, east then west. Faces north when boxed in.
pub fn initial_heading(grid: &Grid, start: GridCell) -> f32 {
    FACINGS
        .iter()
        .find(|((dx, dz), _)| start.offset(*dx, *dz).is_some_and(|cell| grid.is_walkable(cell)))
        .map_or(0.0, |(_, heading)| *heading)
}

/// Patrols swing along the corridor they spawn in.
fn patrol_axis(grid: &Grid, cell: GridCell) -> Axis {
    let open = |dx: isize, dz: isize| cell.offset(dx, dz).is_some_and(|c| grid.is_walkable(c));
    if open(1, 0) || open(-1, 0) {
        Axis::X
    } else {
        Axis::Z
    }
}

/// Builds level `index` using `config`, allocating entity ids from `state`.
///
/// When the sampler comes back short, obstacles are filled first and
/// power-ups get whatever is left.
pub fn build_level<R: Rng + ?Sized>(
    state: &mut SessionState,
    index: usize,
    config: LevelConfig,
    rng: &mut R,
) -> Result<ActiveLevel, MazeError> {
    let generated = maze::generate_with_rng(config.size, config.size, rng)?;
    let grid = generated.grid;
    let start_heading = initial_heading(&grid, generated.start);

    let requested = config.obstacle_count + power_up::EXTRA_SPOTS;
    let spots = maze::sample_spots(&grid, requested, true, rng);
    let obstacle_spots = spots.len().min(config.obstacle_count);

    let mut obstacles = HashMap::with_capacity(obstacle_spots);
    for (i, cell) in spots[..obstacle_spots].iter().enumerate() {
        let id = state.next_entity_id();
        let obstacle = if config.moving_obstacles && i % 2 == 0 {
            let motion = PatrolMotion {
                axis: patrol_axis(&grid, *cell),
                speed: rng.gen_range(hazard::PATROL_SPEED_MIN..=hazard::PATROL_SPEED_MAX),
                range: hazard::PATROL_RANGE,
            };
            Obstacle::patrol(id, cell.center(), motion)
        } else {
            Obstacle::static_spike(id, cell.center())
        };
        obstacles.insert(id, obstacle);
    }

    let power_ups: Vec<PowerUp> = spots[obstacle_spots..]
        .iter()
        .map(|cell| {
            let kind = if rng.gen_bool(power_up::MAP_REVEAL_CHANCE) {
                PowerUpKind::MapReveal
            } else {
                PowerUpKind::ExtraLife
            };
            PowerUp::new(state.next_entity_id(), cell.center(), kind)
        })
        .collect();

    info!(
        "Built level {}: {}x{} maze, {} obstacles, {} power-ups",
        index + 1,
        config.size,
        config.size,
        obstacles.len(),
        power_ups.len()
    );

    Ok(ActiveLevel {
        index,
        grid,
        start: generated.start,
        end: generated.end,
        start_heading,
        obstacles,
        power_ups,
        memorize_secs: config.memorize_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::START_EXCLUSION;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_table_lookup() {
        assert_eq!(LevelConfig::for_index(0), LEVEL_TABLE[0]);
        assert_eq!(LevelConfig::for_index(4), LEVEL_TABLE[4]);
    }

    #[test]
    fn test_extrapolates_past_table() {
        let last = LEVEL_TABLE[LEVEL_TABLE.len() - 1];
        let next = LevelConfig::for_index(LEVEL_TABLE.len());
        assert_eq!(next.size, last.size + level::SIZE_STEP);
        assert_eq!(next.obstacle_count, last.obstacle_count);
        assert_eq!(next.moving_obstacles, last.moving_obstacles);

        let far = LevelConfig::for_index(LEVEL_TABLE.len() + 9);
        assert_eq!(far.size, last.size + level::SIZE_STEP * 10);
        assert_eq!(far.size % 2, 1);
    }

    #[test]
    fn test_table_sizes_are_valid() {
        for config in LEVEL_TABLE {
            assert!(config.size >= maze::MIN_DIMENSION);
            assert_eq!(config.size % 2, 1);
        }
    }

    #[test]
    fn test_initial_heading_priority() {
        // north open wins over everything
        let grid = Grid::from_ascii("#####\n## ##\n# S #\n## ##\n#####\n").unwrap();
        assert_eq!(initial_heading(&grid, GridCell::new(2, 2)), 0.0);

        // south before east
        let grid = Grid::from_ascii("#####\n#####\n##S #\n## ##\n#####\n").unwrap();
        assert_eq!(initial_heading(&grid, GridCell::new(2, 2)), PI);

        let grid = Grid::from_ascii("#####\n#####\n# S #\n#####\n#####\n").unwrap();
        assert_eq!(initial_heading(&grid, GridCell::new(2, 2)), -FRAC_PI_2);

        let grid = Grid::from_ascii("#####\n#####\n# S##\n#####\n#####\n").unwrap();
        assert_eq!(initial_heading(&grid, GridCell::new(2, 2)), FRAC_PI_2);
    }

    #[test]
    fn test_generated_start_faces_open_cell() {
        for seed in 0..10 {
            let maze = maze::generate_from_seed(9, 9, seed).unwrap();
            let heading = initial_heading(&maze.grid, maze.start);
            let ahead = maze.start.center() + crate::util::Vec2::forward(heading);
            let cell = GridCell::containing(ahead).unwrap();
            assert!(maze.grid.is_walkable(cell));
        }
    }

    #[test]
    fn test_build_level_places_entities() {
        let mut state = SessionState::new();
        let mut rng = StdRng::seed_from_u64(11);
        let config = LevelConfig::for_index(3);
        let level = build_level(&mut state, 3, config, &mut rng).unwrap();

        assert_eq!(level.index, 3);
        assert_eq!(level.grid.width(), config.size);
        assert_eq!(level.obstacles.len(), config.obstacle_count);
        assert_eq!(level.power_ups.len(), power_up::EXTRA_SPOTS);
        assert_eq!(level.memorize_secs, config.memorize_secs);

        let patrols = level.obstacles.values().filter(|o| o.is_patrol()).count();
        assert_eq!(patrols, config.obstacle_count.div_ceil(2));

        let mut cells: Vec<GridCell> = level
            .obstacles
            .values()
            .map(|o| GridCell::containing(o.origin).unwrap())
            .chain(level.power_ups.iter().map(|p| GridCell::containing(p.position).unwrap()))
            .collect();
        for cell in &cells {
            assert_eq!(level.grid.get(*cell), Some(maze::CellState::Path));
            assert!(!(cell.x < START_EXCLUSION && cell.z < START_EXCLUSION));
        }
        let total = cells.len();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), total);
    }

    #[test]
    fn test_static_only_levels() {
        let mut state = SessionState::new();
        let mut rng = StdRng::seed_from_u64(3);
        let level = build_level(&mut state, 1, LevelConfig::for_index(1), &mut rng).unwrap();
        assert!(level.obstacles.values().all(|o| !o.is_patrol()));
    }

    #[test]
    fn test_ids_are_unique_across_levels() {
        let mut state = SessionState::new();
        let mut rng = StdRng::seed_from_u64(5);
        let a = build_level(&mut state, 2, LevelConfig::for_index(2), &mut rng).unwrap();
        let b = build_level(&mut state, 2, LevelConfig::for_index(2), &mut rng).unwrap();
        let max_a = a
            .obstacles
            .keys()
            .copied()
            .chain(a.power_ups.iter().map(|p| p.id))
            .max()
            .unwrap();
        let min_b = b
            .obstacles
            .keys()
            .copied()
            .chain(b.power_ups.iter().map(|p| p.id))
            .min()
            .unwrap();
        assert!(min_b > max_a);
    }

    #[test]
    fn test_invalid_size_propagates() {
        let mut state = SessionState::new();
        let mut rng = StdRng::seed_from_u64(1);
        let bad = LevelConfig::new(8, 1, false, 3);
        assert!(matches!(
            build_level(&mut state, 0, bad, &mut rng),
            Err(MazeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_huge_index_saturates_and_is_rejected() {
        let config = LevelConfig::for_index(usize::MAX);
        assert_eq!(config.size, usize::MAX);

        let mut state = SessionState::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            build_level(&mut state, usize::MAX, config, &mut rng),
            Err(MazeError::InvalidDimensions { .. })
        ));
    }
}
