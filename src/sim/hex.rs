//! Hex grid addressing using offset coordinates (odd-r)
//!
//! Pointy-top hexes packed into a rectangle: odd rows are shifted right by one
//! bubble radius. Row 0 is the ceiling and rows grow downward, matching screen
//! space where y increases toward the shooter.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::GameConfig;

/// Square root of 3, used frequently in hex math.
pub const SQRT_3: f32 = 1.732_050_8;

/// Column deltas per row delta for even rows
const EVEN_ROW_DIRECTIONS: [(i32, i32); 6] = [
    (0, 1),   // East
    (-1, 0),  // Northeast
    (-1, -1), // Northwest
    (0, -1),  // West
    (1, -1),  // Southwest
    (1, 0),   // Southeast
];

/// Odd rows sit half a hex to the right, so the diagonals lean the other way
const ODD_ROW_DIRECTIONS: [(i32, i32); 6] = [
    (0, 1),  // East
    (-1, 1), // Northeast
    (-1, 0), // Northwest
    (0, -1), // West
    (1, 0),  // Southwest
    (1, 1),  // Southeast
];

/// A grid cell address. Signed so neighbor math can step off the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub row: i32,
    pub col: i32,
}

impl HexCoord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Odd rows are the shifted ones
    #[inline]
    pub const fn is_odd_row(&self) -> bool {
        self.row % 2 != 0
    }

    /// All six neighbor addresses, in bounds or not
    pub fn raw_neighbors(&self) -> [HexCoord; 6] {
        let table = if self.is_odd_row() {
            ODD_ROW_DIRECTIONS
        } else {
            EVEN_ROW_DIRECTIONS
        };
        table.map(|(dr, dc)| HexCoord::new(self.row + dr, self.col + dc))
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Mapping between cells and pixels for one grid geometry.
///
/// Holds no state beyond the numbers it was built from. Build a fresh one
/// from the current config instead of keeping one around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    pub radius: f32,
    pub rows: usize,
    pub cols: usize,
}

impl HexLayout {
    pub fn new(radius: f32, rows: usize, cols: usize) -> Self {
        debug_assert!(radius > 0.0, "hex radius must be positive");
        Self { radius, rows, cols }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.radius, config.rows(), config.columns)
    }

    /// Vertical distance between row centers
    #[inline]
    pub fn row_height(&self) -> f32 {
        self.radius * SQRT_3
    }

    #[inline]
    pub fn contains(&self, coord: HexCoord) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && (coord.row as usize) < self.rows
            && (coord.col as usize) < self.cols
    }

    /// Pixel center of a cell
    pub fn cell_to_pixel(&self, coord: HexCoord) -> Vec2 {
        let r = self.radius;
        let shift = if coord.is_odd_row() { r } else { 0.0 };
        Vec2::new(
            coord.col as f32 * 2.0 * r + r + shift,
            coord.row as f32 * self.row_height() + r,
        )
    }

    /// Nearest cell to a pixel, clamped onto the grid.
    ///
    /// Row is found first, then the column with that row's shift removed.
    /// Off-grid points land on an edge cell rather than failing.
    pub fn pixel_to_cell(&self, pos: Vec2) -> HexCoord {
        let r = self.radius;
        let max_row = self.rows.saturating_sub(1) as i32;
        let max_col = self.cols.saturating_sub(1) as i32;

        let row = ((pos.y - r) / self.row_height()).round() as i32;
        let row = row.clamp(0, max_row);

        let shift = if row % 2 != 0 { r } else { 0.0 };
        let col = ((pos.x - r - shift) / (2.0 * r)).round() as i32;
        let col = col.clamp(0, max_col);

        HexCoord::new(row, col)
    }

    /// In-bounds neighbors of a cell (0 to 6 of them)
    pub fn neighbors(&self, coord: HexCoord) -> Vec<HexCoord> {
        coord
            .raw_neighbors()
            .into_iter()
            .filter(|n| self.contains(*n))
            .collect()
    }

    /// Every cell in row-major order
    pub fn cells(&self) -> impl Iterator<Item = HexCoord> + use<> {
        let (rows, cols) = (self.rows as i32, self.cols as i32);
        (0..rows).flat_map(move |row| (0..cols).map(move |col| HexCoord::new(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layout() -> HexLayout {
        HexLayout::new(20.0, 16, 10)
    }

    #[test]
    fn test_cell_to_pixel_even_and_odd() {
        let l = layout();
        assert_eq!(l.cell_to_pixel(HexCoord::new(0, 0)), Vec2::new(20.0, 20.0));
        let odd = l.cell_to_pixel(HexCoord::new(1, 0));
        assert!((odd.x - 40.0).abs() < 1e-4);
        assert!((odd.y - (20.0 * SQRT_3 + 20.0)).abs() < 1e-4);
    }

    #[test]
    fn test_pixel_roundtrip_even_row() {
        let l = layout();
        let original = HexCoord::new(2, 5);
        assert_eq!(l.pixel_to_cell(l.cell_to_pixel(original)), original);
    }

    #[test]
    fn test_pixel_roundtrip_odd_row() {
        let l = layout();
        let original = HexCoord::new(3, 3);
        assert_eq!(l.pixel_to_cell(l.cell_to_pixel(original)), original);
    }

    #[test]
    fn test_pixel_to_cell_clamps() {
        let l = layout();
        assert_eq!(l.pixel_to_cell(Vec2::new(-500.0, -500.0)), HexCoord::new(0, 0));
        assert_eq!(
            l.pixel_to_cell(Vec2::new(5000.0, 5000.0)),
            HexCoord::new(15, 9)
        );
    }

    #[test]
    fn test_neighbor_counts() {
        let l = layout();
        // Top-left corner of an even row: east, southeast only
        assert_eq!(l.neighbors(HexCoord::new(0, 0)).len(), 2);
        // Interior cell
        assert_eq!(l.neighbors(HexCoord::new(5, 5)).len(), 6);
        // Right edge of an odd row loses east and both right diagonals
        assert_eq!(l.neighbors(HexCoord::new(3, 9)).len(), 3);
    }

    #[test]
    fn test_neighbors_are_touching() {
        let l = layout();
        for coord in [HexCoord::new(4, 4), HexCoord::new(5, 4)] {
            let center = l.cell_to_pixel(coord);
            for n in l.neighbors(coord) {
                let d = center.distance(l.cell_to_pixel(n));
                assert!((d - 40.0).abs() < 1e-3, "{coord} -> {n} is {d} apart");
            }
        }
    }

    #[test]
    fn test_cells_row_major() {
        let l = HexLayout::new(10.0, 2, 3);
        let cells: Vec<_> = l.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], HexCoord::new(0, 0));
        assert_eq!(cells[3], HexCoord::new(1, 0));
    }

    proptest! {
        #[test]
        fn neighbors_are_symmetric(row in 0i32..16, col in 0i32..10) {
            let l = layout();
            let a = HexCoord::new(row, col);
            for b in l.neighbors(a) {
                prop_assert!(l.neighbors(b).contains(&a), "{} -> {} not mirrored", a, b);
            }
        }
    }
}
