//! The bubble occupancy grid.
//!
//! Dense `rows × cols` storage; every access is bounds-checked and anything
//! off the grid reads as empty space that can't be filled.

use serde::{Deserialize, Serialize};

use super::hex::HexCoord;

/// A palette color id (1..=palette size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BubbleColor(pub u8);

impl std::fmt::Display for BubbleColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "color#{}", self.0)
    }
}

/// The main grid holding all bubbles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BubbleGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<BubbleColor>>,
}

impl BubbleGrid {
    /// Create an empty grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, coord: HexCoord) -> Option<usize> {
        if coord.row < 0 || coord.col < 0 {
            return None;
        }
        let (row, col) = (coord.row as usize, coord.col as usize);
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Check if a coordinate is on the grid
    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        self.index(coord).is_some()
    }

    /// Color at a cell, `None` for empty or off-grid
    pub fn get(&self, coord: HexCoord) -> Option<BubbleColor> {
        self.index(coord).and_then(|i| self.cells[i])
    }

    /// Check if a cell is occupied
    pub fn is_occupied(&self, coord: HexCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Check if a cell is on the grid and free to receive a bubble
    pub fn is_empty_valid(&self, coord: HexCoord) -> bool {
        self.index(coord).is_some_and(|i| self.cells[i].is_none())
    }

    /// Write a color (or clear with `None`); off-grid writes are ignored
    pub fn set(&mut self, coord: HexCoord, color: Option<BubbleColor>) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = color;
        }
    }

    /// Check if the grid has no bubbles
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Get the number of bubbles in the grid
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Occupied cells with their colors, row-major
    pub fn occupied(&self) -> impl Iterator<Item = (HexCoord, BubbleColor)> + '_ {
        let cols = self.cols;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|color| (HexCoord::new((i / cols) as i32, (i % cols) as i32), color))
        })
    }

    /// Get the lowest row (highest index) that has bubbles
    pub fn lowest_row(&self) -> Option<usize> {
        self.occupied().map(|(c, _)| c.row as usize).max()
    }
}
