//! Grid Geometry
//!
//! Pure coordinate math for the square treasure grid.
//! Cells are 0-indexed row-major: `cell = row * GRID_SIDE + col`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Side length of the grid.
pub const GRID_SIDE: u8 = 10;

/// Total number of cells on the grid.
pub const GRID_CELLS: u8 = GRID_SIDE * GRID_SIDE;

// =============================================================================
// CELL
// =============================================================================

/// A single grid cell, guaranteed to lie in `[0, GRID_CELLS)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Cell(u8);

impl Cell {
    /// Top-left corner. Freshly joined players start here.
    pub const ORIGIN: Cell = Cell(0);

    /// Create a cell from a raw index.
    pub fn new(index: u8) -> Result<Self, GridError> {
        if index < GRID_CELLS {
            Ok(Self(index))
        } else {
            Err(GridError::InvalidCell(index))
        }
    }

    /// Create a cell from row and column.
    pub fn from_row_col(row: u8, col: u8) -> Result<Self, GridError> {
        if row >= GRID_SIDE || col >= GRID_SIDE {
            return Err(GridError::OutOfBounds);
        }
        Ok(Self(row * GRID_SIDE + col))
    }

    /// Map an arbitrary random word onto the grid (`value mod GRID_CELLS`).
    #[inline]
    pub fn from_random(value: u64) -> Self {
        Self((value % GRID_CELLS as u64) as u8)
    }

    /// Raw index.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Row of this cell.
    #[inline]
    pub const fn row(self) -> u8 {
        self.0 / GRID_SIDE
    }

    /// Column of this cell.
    #[inline]
    pub const fn col(self) -> u8 {
        self.0 % GRID_SIDE
    }

    /// Neighbor in `direction`, if it stays on the grid.
    #[inline]
    pub fn step(self, direction: Direction) -> Result<Cell, GridError> {
        step(self, direction)
    }
}

impl TryFrom<u8> for Cell {
    type Error = GridError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Cell::new(value)
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        cell.0
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({},{})", self.0, self.row(), self.col())
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// One of the four orthogonal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Column - 1
    Left,
    /// Row - 1
    Up,
    /// Column + 1
    Right,
    /// Row + 1
    Down,
}

impl Direction {
    /// Neighbor enumeration order used by [`adjacent_cells`].
    ///
    /// Randomness-derived selectors index into this order, so it must never change.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];
}

impl FromStr for Direction {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Direction::Left),
            "up" | "u" => Ok(Direction::Up),
            "right" | "r" => Ok(Direction::Right),
            "down" | "d" => Ok(Direction::Down),
            _ => Err(GridError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
        };
        f.write_str(name)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Grid geometry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The step would leave the grid.
    #[error("move leaves the grid")]
    OutOfBounds,

    /// Raw index outside the grid.
    #[error("cell index {0} outside the grid")]
    InvalidCell(u8),

    /// Unparseable direction name.
    #[error("unknown direction: {0:?}")]
    UnknownDirection(String),
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Compute the neighbor of `position` in `direction`.
///
/// Fails with [`GridError::OutOfBounds`] when moving left from column 0,
/// right from the last column, up from row 0 or down from the last row.
pub fn step(position: Cell, direction: Direction) -> Result<Cell, GridError> {
    let index = position.index();
    let next = match direction {
        Direction::Left if position.col() > 0 => index - 1,
        Direction::Right if position.col() < GRID_SIDE - 1 => index + 1,
        Direction::Up if position.row() > 0 => index - GRID_SIDE,
        Direction::Down if position.row() < GRID_SIDE - 1 => index + GRID_SIDE,
        _ => return Err(GridError::OutOfBounds),
    };
    Ok(Cell(next))
}

/// Valid neighbors of `position` in stable left, up, right, down order.
///
/// Corners have 2 neighbors, edges 3, interior cells 4.
pub fn adjacent_cells(position: Cell) -> Vec<Cell> {
    Direction::ALL
        .iter()
        .filter_map(|&direction| step(position, direction).ok())
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
