//! Projectile - the bubble being shot.
//!
//! The projectile travels in a straight line, bouncing off the side walls,
//! until it touches a grid bubble or the ceiling. Contact resolves to a snap
//! cell (or nothing, when the neighborhood is full).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::{BubbleColor, BubbleGrid};
use super::hex::{HexCoord, HexLayout};
use crate::aim_direction;

/// What the projectile touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    /// An occupied grid cell
    Bubble(HexCoord),
    /// The top of the playfield
    Ceiling,
}

/// Outcome of a contact: where the bubble lands, if anywhere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub contact: Contact,
    /// Position of the projectile center at contact
    pub position: Vec2,
    /// Cell to place into; `None` wastes the shot
    pub snap: Option<HexCoord>,
}

/// Result of advancing a projectile by one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepResult {
    /// Reflected off a side wall during this step
    pub bounced: bool,
    /// Set when the flight ended this step
    pub resolution: Option<Resolution>,
}

/// A bubble in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    /// Velocity in pixels per second (screen space, y down)
    pub vel: Vec2,
    pub color: BubbleColor,
    /// Side-wall reflections so far
    pub bounces: u32,
    pub active: bool,
}

impl Projectile {
    /// Launch from `pos` along an aim angle (radians, 90° is straight up)
    pub fn launch(pos: Vec2, angle: f32, speed: f32, color: BubbleColor) -> Self {
        Self {
            pos,
            vel: aim_direction(angle) * speed,
            color,
            bounces: 0,
            active: true,
        }
    }

    /// Move by `dt` seconds and reflect off the side walls.
    ///
    /// Returns true if a wall was hit.
    pub fn integrate(&mut self, dt: f32, radius: f32, canvas_width: f32) -> bool {
        self.pos += self.vel * dt;

        let left = radius;
        let right = canvas_width - radius;
        self.pos.x = self.pos.x.clamp(left, right);

        // Reflect only when heading into the wall being touched
        let into_left = self.pos.x <= left && self.vel.x < 0.0;
        let into_right = self.pos.x >= right && self.vel.x > 0.0;
        if into_left || into_right {
            self.vel.x = -self.vel.x;
            self.bounces += 1;
            log::trace!("Wall bounce #{} at {:?}", self.bounces, self.pos);
            return true;
        }
        false
    }

    /// Advance one tick: integrate, bounce, then test for contact.
    ///
    /// On contact the projectile is deactivated and the snap cell chosen.
    pub fn step(
        &mut self,
        dt: f32,
        grid: &BubbleGrid,
        layout: &HexLayout,
        canvas_width: f32,
    ) -> StepResult {
        if !self.active {
            return StepResult::default();
        }

        let bounced = self.integrate(dt, layout.radius, canvas_width);

        let resolution = find_contact(self.pos, grid, layout).map(|contact| {
            self.active = false;
            Resolution {
                contact,
                position: self.pos,
                snap: snap_cell(contact, self.pos, grid, layout),
            }
        });

        StepResult {
            bounced,
            resolution,
        }
    }
}

/// Check for collision with grid bubbles, then the ceiling.
///
/// The scan is row-major and stops at the first bubble closer than two
/// radii; it does not look for the nearest one.
pub fn find_contact(pos: Vec2, grid: &BubbleGrid, layout: &HexLayout) -> Option<Contact> {
    let collision_distance = 2.0 * layout.radius;

    let hit = grid
        .occupied()
        .map(|(coord, _)| coord)
        .find(|&coord| pos.distance(layout.cell_to_pixel(coord)) < collision_distance);

    match hit {
        Some(coord) => Some(Contact::Bubble(coord)),
        None if pos.y <= layout.radius => Some(Contact::Ceiling),
        None => None,
    }
}

/// Pick the cell a projectile at `pos` settles into after `contact`.
pub fn snap_cell(
    contact: Contact,
    pos: Vec2,
    grid: &BubbleGrid,
    layout: &HexLayout,
) -> Option<HexCoord> {
    match contact {
        Contact::Bubble(hit) => {
            // Closest free neighbor of the bubble we touched; ties keep the
            // first in neighbor order
            let mut best: Option<(HexCoord, f32)> = None;
            for n in layout.neighbors(hit) {
                if !grid.is_empty_valid(n) {
                    continue;
                }
                let d = pos.distance_squared(layout.cell_to_pixel(n));
                if best.is_none_or(|(_, best_d)| d < best_d) {
                    best = Some((n, d));
                }
            }

            best.map(|(coord, _)| coord).or_else(|| {
                let fallback = layout.pixel_to_cell(pos);
                grid.is_empty_valid(fallback).then_some(fallback)
            })
        }
        Contact::Ceiling => {
            let target = layout.pixel_to_cell(Vec2::new(pos.x, layout.radius));
            grid.is_empty_valid(target).then_some(target)
        }
    }
}
