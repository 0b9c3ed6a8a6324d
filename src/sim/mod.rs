//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded sequence generator only
//! - Row-major iteration wherever order is observable
//! - No rendering or platform dependencies

pub mod connectivity;
pub mod grid;
pub mod hex;
pub mod projectile;
pub mod rng;
pub mod round;
pub mod scoring;

pub use connectivity::{ceiling_reachable, prune_floating, same_color_cluster};
pub use grid::{BubbleColor, BubbleGrid};
pub use hex::{HexCoord, HexLayout, SQRT_3};
pub use projectile::{Contact, Projectile, Resolution, StepResult, find_contact, snap_cell};
pub use rng::SequenceGenerator;
pub use round::{DebugProbe, Round, RoundEvent, RoundState, RoundStats};
pub use scoring::{bounce_multiplier, cluster_points, floating_points};
