//! Discrete wall grid
//!
//! Cells are unit squares centred on integer coordinates. Storage is
//! row-major, so cell `(x, z)` lives at index `z * width + x`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use super::MazeError;
use crate::util::Vec2;

/// State of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    Wall,
    Path,
    Start,
    End,
}

impl CellState {
    /// Start, End and Path cells can all be walked on.
    #[inline]
    pub fn is_walkable(self) -> bool {
        !matches!(self, CellState::Wall)
    }

    pub fn symbol(self) -> char {
        match self {
            CellState::Wall => '#',
            CellState::Path => ' ',
            CellState::Start => 'S',
            CellState::End => 'E',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '#' => Some(CellState::Wall),
            ' ' | '.' => Some(CellState::Path),
            'S' => Some(CellState::Start),
            'E' => Some(CellState::End),
            _ => None,
        }
    }
}

/// Integer cell coordinate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridCell {
    pub x: usize,
    pub z: usize,
}

impl GridCell {
    #[inline]
    pub const fn new(x: usize, z: usize) -> Self {
        Self { x, z }
    }

    /// Cell containing a continuous position.
    ///
    /// Returns `None` for non-finite positions or positions left of / above
    /// the grid origin. The upper bound is checked against a grid by the caller.
    pub fn containing(position: Vec2) -> Option<Self> {
        if !position.is_finite() {
            return None;
        }
        let x = (position.x + 0.5).floor();
        let z = (position.z + 0.5).floor();
        if x < 0.0 || z < 0.0 {
            return None;
        }
        Some(Self::new(x as usize, z as usize))
    }

    /// World-space centre of the cell
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.z as f32)
    }

    pub fn manhattan_distance(&self, other: GridCell) -> usize {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }

    /// Offsets the cell by `(dx, dz)`, returning `None` below zero.
    pub fn offset(&self, dx: isize, dz: isize) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add_signed(dx)?,
            self.z.checked_add_signed(dz)?,
        ))
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Cardinal neighbour offsets in north, south, east, west order
pub const CARDINALS: [(isize, isize); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];

/// Rectangular grid of cell states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// Creates a grid with every cell set to `state`.
    pub fn filled(width: usize, height: usize, state: CellState) -> Self {
        Self {
            width,
            height,
            cells: vec![state; width * height],
        }
    }

    /// An empty 0x0 grid, used before the first level is built.
    pub fn empty() -> Self {
        Self::filled(0, 0, CellState::Wall)
    }

    /// Parses a grid from rows of `#` (wall), space or `.` (path),
    /// `S` (start) and `E` (end).
    pub fn from_ascii(layout: &str) -> Result<Self, MazeError> {
        let rows: Vec<&str> = layout.lines().filter(|line| !line.is_empty()).collect();
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Err(MazeError::EmptyLayout);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (z, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MazeError::RaggedRow {
                    row: z,
                    found,
                    expected: width,
                });
            }
            for (x, symbol) in row.chars().enumerate() {
                let state = CellState::from_symbol(symbol)
                    .ok_or(MazeError::UnknownSymbol { symbol, x, z })?;
                cells.push(state);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// Renders the grid with the symbols accepted by [`Grid::from_ascii`].
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.rows() {
            out.extend(row.iter().map(|state| state.symbol()));
            out.push('\n');
        }
        out
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x < self.width && cell.z < self.height
    }

    #[inline]
    fn index(&self, cell: GridCell) -> usize {
        cell.z * self.width + cell.x
    }

    pub fn get(&self, cell: GridCell) -> Option<CellState> {
        if self.contains(cell) {
            Some(self.cells[self.index(cell)])
        } else {
            None
        }
    }

    /// Sets a cell's state. Out-of-bounds writes are ignored.
    pub fn set(&mut self, cell: GridCell, state: CellState) {
        debug_assert!(self.contains(cell), "write outside grid at {cell}");
        if self.contains(cell) {
            let index = self.index(cell);
            self.cells[index] = state;
        }
    }

    /// True when the cell is inside the grid and not a wall.
    #[inline]
    pub fn is_walkable(&self, cell: GridCell) -> bool {
        self.get(cell).is_some_and(CellState::is_walkable)
    }

    /// Rows in `[z][x]` order
    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        // chunks() rejects a zero chunk size
        self.cells.chunks(self.width.max(1))
    }

    /// Every cell with its state, row by row
    pub fn cells(&self) -> impl Iterator<Item = (GridCell, CellState)> + '_ {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &state)| (GridCell::new(i % width, i / width), state))
    }

    /// First cell in the given state, scanning row by row.
    pub fn find(&self, state: CellState) -> Option<GridCell> {
        self.cells()
            .find(|&(_, s)| s == state)
            .map(|(cell, _)| cell)
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|s| s.is_walkable()).count()
    }

    /// Walkable 4-connected neighbours in north, south, east, west order.
    pub fn walkable_neighbors(&self, cell: GridCell) -> SmallVec<[GridCell; 4]> {
        CARDINALS
            .iter()
            .filter_map(|&(dx, dz)| cell.offset(dx, dz))
            .filter(|&next| self.is_walkable(next))
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}
