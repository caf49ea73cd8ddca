//! Logical placement of a cell inside the rectangular bath
//!
//! Neighbor links wrap around the grid like a torus, but no physics may read
//! across the wrap. A cell's [`Placement`] is derived once from its coordinates
//! when the grid links its cells, and tells which of its four links leave the
//! physical domain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row/column identity of a cell (row-major, row 0 at the top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoords {
    pub row: usize,
    pub col: usize,
}

impl CellCoords {
    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four neighbor links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions in link order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }
}

/// A straight wall of the bath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// The single neighbor that points into the bath
    #[inline]
    #[must_use]
    pub const fn inward(self) -> Direction {
        match self {
            Side::Top => Direction::South,
            Side::Bottom => Direction::North,
            Side::Left => Direction::East,
            Side::Right => Direction::West,
        }
    }

    /// Whether the wall normal runs along rows (y) rather than columns (x)
    #[inline]
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

/// A corner of the bath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// The two edge-facing neighbors a corner averages over
    #[inline]
    #[must_use]
    pub const fn inward(self) -> [Direction; 2] {
        match self {
            Corner::TopLeft => [Direction::East, Direction::South],
            Corner::TopRight => [Direction::West, Direction::South],
            Corner::BottomLeft => [Direction::East, Direction::North],
            Corner::BottomRight => [Direction::West, Direction::North],
        }
    }
}

/// Where a cell sits relative to the domain boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    Interior,
    Edge(Side),
    Corner(Corner),
}

impl Placement {
    /// Classify `coords` in a `rows` x `cols` domain.
    ///
    /// Single-row or single-column domains have no interior; every cell on them
    /// is classified by the first wall that applies.
    #[must_use]
    pub fn classify(coords: CellCoords, rows: usize, cols: usize) -> Self {
        let top = coords.row == 0;
        let bottom = coords.row + 1 == rows;
        let left = coords.col == 0;
        let right = coords.col + 1 == cols;

        match (top, bottom, left, right) {
            (true, _, true, _) => Placement::Corner(Corner::TopLeft),
            (true, _, _, true) => Placement::Corner(Corner::TopRight),
            (_, true, true, _) => Placement::Corner(Corner::BottomLeft),
            (_, true, _, true) => Placement::Corner(Corner::BottomRight),
            (true, ..) => Placement::Edge(Side::Top),
            (_, true, ..) => Placement::Edge(Side::Bottom),
            (_, _, true, _) => Placement::Edge(Side::Left),
            (.., true) => Placement::Edge(Side::Right),
            _ => Placement::Interior,
        }
    }

    /// Whether the link in `direction` wraps around the torus
    #[must_use]
    pub fn wraps(coords: CellCoords, rows: usize, cols: usize, direction: Direction) -> bool {
        match direction {
            Direction::North => coords.row == 0,
            Direction::South => coords.row + 1 == rows,
            Direction::West => coords.col == 0,
            Direction::East => coords.col + 1 == cols,
        }
    }
}
