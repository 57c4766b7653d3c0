//! Board state.
//!
//! A square grid of cells shared by both participants of a match. The
//! dimension is fixed at construction and never changes; a cell, once
//! marked, is never cleared or overwritten for the life of the session.

use serde::{Deserialize, Serialize};

/// Default board dimension.
pub const DEFAULT_DIMENSION: usize = 10;

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// No mark yet
    #[default]
    Empty,
    /// Marked by the session owner
    Owner,
    /// Marked by the opponent
    Opponent,
}

impl Cell {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Owner => "owner",
            Self::Opponent => "opponent",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Zero-based grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({"x": self.x, "y": self.y})
    }
}

/// Square game board.
///
/// Cells are stored row-major; `(x, y)` indexes row `x`, column `y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    dimension: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            cells: vec![Cell::Empty; dimension * dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Check if coordinates fall inside the grid.
    pub fn in_range(&self, x: usize, y: usize) -> bool {
        x < self.dimension && y < self.dimension
    }

    /// Get the cell at `(x, y)`, if in range.
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if self.in_range(x, y) {
            Some(self.cells[x * self.dimension + y])
        } else {
            None
        }
    }

    /// Check if the cell at `(x, y)` is in range and unmarked.
    pub fn is_free(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some_and(|cell| cell.is_empty())
    }

    /// Check if every cell is marked.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// Count of marked cells.
    pub fn mark_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// Write a mark. Callers check range and freeness first; writes through
    /// the session never clear a cell.
    pub(crate) fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[x * self.dimension + y] = cell;
    }

    /// Iterate rows of cells.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.dimension)
    }

    /// Convert board to JSON (rows of cell strings).
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .rows()
            .map(|row| {
                let cells: Vec<serde_json::Value> = row
                    .iter()
                    .map(|c| serde_json::json!(c.as_str()))
                    .collect();
                serde_json::Value::Array(cells)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}
