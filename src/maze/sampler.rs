//! Random placement of entities on open cells

use rand::Rng;
use rustc_hash::FxHashSet;
use tracing::debug;

use super::grid::{CellState, Grid, GridCell};

/// Upper bound on random draws for a single sampling request
pub const MAX_SAMPLE_ATTEMPTS: usize = 1000;

/// Side of the square block at the start corner that can be kept clear
pub const START_EXCLUSION: usize = 4;

/// Picks up to `count` distinct `Path` cells by rejection sampling.
///
/// Start and End cells are never returned. With `exclude_near_start`,
/// cells with `x < 4 && z < 4` are skipped so nothing spawns on top of the
/// player. Gives up after [`MAX_SAMPLE_ATTEMPTS`] draws and returns what it
/// found; a short result is not an error.
pub fn sample_spots<R: Rng + ?Sized>(
    grid: &Grid,
    count: usize,
    exclude_near_start: bool,
    rng: &mut R,
) -> Vec<GridCell> {
    let mut spots = Vec::with_capacity(count);
    if count == 0 || grid.width() == 0 || grid.height() == 0 {
        return spots;
    }

    let mut taken = FxHashSet::default();
    let mut attempts = 0;
    while spots.len() < count && attempts < MAX_SAMPLE_ATTEMPTS {
        attempts += 1;
        let cell = GridCell::new(rng.gen_range(0..grid.width()), rng.gen_range(0..grid.height()));

        if grid.get(cell) != Some(CellState::Path) {
            continue;
        }
        if exclude_near_start && cell.x < START_EXCLUSION && cell.z < START_EXCLUSION {
            continue;
        }
        if taken.insert(cell) {
            spots.push(cell);
        }
    }

    if spots.len() < count {
        debug!(
            "Spot sampler found {} of {} requested cells in {} attempts",
            spots.len(),
            count,
            attempts
        );
    }
    spots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::generate_from_seed;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_count_is_empty() {
        let maze = generate_from_seed(11, 11, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample_spots(&maze.grid, 0, false, &mut rng).is_empty());
        assert!(sample_spots(&maze.grid, 0, true, &mut rng).is_empty());
    }

    #[test]
    fn test_spots_are_distinct_path_cells() {
        for seed in 0..20 {
            let maze = generate_from_seed(15, 13, seed).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let spots = sample_spots(&maze.grid, 12, false, &mut rng);

            let unique: FxHashSet<_> = spots.iter().copied().collect();
            assert_eq!(unique.len(), spots.len());
            for spot in &spots {
                assert_eq!(maze.grid.get(*spot), Some(CellState::Path));
            }
        }
    }

    #[test]
    fn test_excludes_start_block() {
        for seed in 0..20 {
            let maze = generate_from_seed(9, 9, seed).unwrap();
            let mut rng = StdRng::seed_from_u64(seed + 100);
            let spots = sample_spots(&maze.grid, 30, true, &mut rng);
            for spot in &spots {
                assert!(
                    !(spot.x < START_EXCLUSION && spot.z < START_EXCLUSION),
                    "{spot} lies in the start block"
                );
            }
        }
    }

    #[test]
    fn test_underfill_returns_short_result() {
        // only three path cells exist
        let grid = Grid::from_ascii("#####\n#S.E#\n#.#.#\n#####\n").unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let spots = sample_spots(&grid, 10, false, &mut rng);
        assert!(spots.len() <= 3);
        assert!(spots.len() < 10);
        for spot in &spots {
            assert_eq!(grid.get(*spot), Some(CellState::Path));
        }
    }

    #[test]
    fn test_small_grid_finds_all_open_cells() {
        let grid = Grid::from_ascii("#####\n#S.E#\n#.#.#\n#####\n").unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let mut spots = sample_spots(&grid, 3, false, &mut rng);
        spots.sort();
        assert_eq!(
            spots,
            vec![GridCell::new(1, 2), GridCell::new(2, 1), GridCell::new(3, 2)]
        );
    }
}
