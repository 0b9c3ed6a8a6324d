//! Cluster detection and ceiling support.
//!
//! Both searches are plain BFS over hex neighbors. Only set membership
//! matters, so visiting order is irrelevant.

use std::collections::{HashSet, VecDeque};

use super::grid::BubbleGrid;
use super::hex::{HexCoord, HexLayout};

/// Find all connected bubbles of the same color as `start` using flood fill.
///
/// Empty (or off-grid) start cells give an empty set. The start cell is
/// included otherwise.
pub fn same_color_cluster(grid: &BubbleGrid, layout: &HexLayout, start: HexCoord) -> HashSet<HexCoord> {
    let mut cluster = HashSet::new();
    let Some(target) = grid.get(start) else {
        return cluster;
    };

    let mut queue = VecDeque::new();
    cluster.insert(start);
    queue.push_back(start);

    while let Some(coord) = queue.pop_front() {
        for neighbor in layout.neighbors(coord) {
            if grid.get(neighbor) == Some(target) && cluster.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    cluster
}

/// Find all bubbles connected to the top row through any colors.
pub fn ceiling_reachable(grid: &BubbleGrid, layout: &HexLayout) -> HashSet<HexCoord> {
    let mut anchored = HashSet::new();
    let mut queue = VecDeque::new();

    for col in 0..grid.cols() as i32 {
        let coord = HexCoord::new(0, col);
        if grid.is_occupied(coord) {
            anchored.insert(coord);
            queue.push_back(coord);
        }
    }

    while let Some(coord) = queue.pop_front() {
        for neighbor in layout.neighbors(coord) {
            if grid.is_occupied(neighbor) && anchored.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    anchored
}

/// Remove every bubble not held up by the ceiling.
///
/// Returns the removed cells in row-major order; the count is its length.
pub fn prune_floating(grid: &mut BubbleGrid, layout: &HexLayout) -> Vec<HexCoord> {
    let anchored = ceiling_reachable(grid, layout);
    let floating: Vec<HexCoord> = grid
        .occupied()
        .map(|(coord, _)| coord)
        .filter(|coord| !anchored.contains(coord))
        .collect();

    for &coord in &floating {
        grid.set(coord, None);
    }

    if !floating.is_empty() {
        log::debug!("Dropped {} floating bubbles", floating.len());
    }

    floating
}
