//! Points for popped and dropped bubbles

use crate::consts::{BOUNCE_BONUS, CLUSTER_POINTS, FLOATING_POINTS};

/// Score multiplier for a shot that bounced off the side walls `bounces` times
#[inline]
pub fn bounce_multiplier(bounces: u32) -> f64 {
    1.0 + BOUNCE_BONUS * bounces as f64
}

/// Points for popping a cluster of `size` bubbles
pub fn cluster_points(size: usize, bounces: u32) -> u64 {
    (size as f64 * CLUSTER_POINTS as f64 * bounce_multiplier(bounces)).floor() as u64
}

/// Points for dropping `count` floating bubbles
pub fn floating_points(count: usize, bounces: u32) -> u64 {
    (count as f64 * FLOATING_POINTS as f64 * bounce_multiplier(bounces)).floor() as u64
}
