//! Bubble Pop - simulation core for a hex-grid bubble shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (hex grid, projectile physics, matching, round state)
//! - `settings`: Difficulty tiers resolved into per-round geometry
//! - `highscores`: In-memory leaderboard ranking
//!
//! Nothing here draws. A presentation layer reads the round state, drains its
//! events, and feeds back aim/fire/tick/restart commands.

pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{ConfigError, Difficulty, GameConfig};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by drivers (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest dt a single tick integrates (frame hitches are clamped to this)
    pub const MAX_TICK_DT: f32 = 0.1;

    /// Rows kept above the visible playfield
    pub const BUFFER_ROWS: usize = 2;
    /// Smallest same-color group that pops
    pub const MIN_CLUSTER_SIZE: usize = 3;
    /// Misses in a row before a new row is pushed in from the ceiling
    pub const SHOTS_PER_NEW_ROW: u32 = 5;

    /// Projectile speed in pixels per second
    pub const PROJECTILE_SPEED: f32 = 600.0;

    /// Aim cone, measured from the horizontal with straight up at 90°
    pub const MIN_AIM_DEG: f32 = 10.0;
    pub const MAX_AIM_DEG: f32 = 170.0;
    pub const DEFAULT_AIM_DEG: f32 = 90.0;

    /// Points per bubble in a popped cluster
    pub const CLUSTER_POINTS: u64 = 10;
    /// Points per dropped (floating) bubble
    pub const FLOATING_POINTS: u64 = 20;
    /// Score multiplier added per wall bounce
    pub const BOUNCE_BONUS: f64 = 0.25;
}

/// Clamp an aim angle (radians) into the allowed cone
#[inline]
pub fn clamp_aim_angle(angle: f32) -> f32 {
    angle.clamp(
        consts::MIN_AIM_DEG.to_radians(),
        consts::MAX_AIM_DEG.to_radians(),
    )
}

/// Aim angle from the shooter toward a pointer position.
///
/// Screen y grows downward, so a pointer straight above the shooter gives
/// π/2. Pointers below the shooter line clamp to the nearest cone edge.
pub fn aim_angle_toward(shooter: Vec2, pointer: Vec2) -> f32 {
    let dx = pointer.x - shooter.x;
    let dy = shooter.y - pointer.y;
    let mut angle = dy.atan2(dx);
    if angle < 0.0 {
        // Below the horizon: snap to whichever side the pointer is on
        angle = if dx < 0.0 {
            std::f32::consts::PI
        } else {
            0.0
        };
    }
    clamp_aim_angle(angle)
}

/// Unit direction for an aim angle in screen space (y down)
#[inline]
pub fn aim_direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), -angle.sin())
}
