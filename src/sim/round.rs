//! Round state and the commands that drive it
//!
//! A `Round` owns everything one game needs: config, generator, grid, the
//! live projectile and the score. Drivers call `set_aim_angle`, `fire`,
//! `tick` and `restart` one at a time; each call runs to completion.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::connectivity::{prune_floating, same_color_cluster};
use super::grid::{BubbleColor, BubbleGrid};
use super::hex::{HexCoord, HexLayout};
use super::projectile::{Contact, Projectile};
use super::rng::SequenceGenerator;
use super::scoring::{cluster_points, floating_points};
use crate::consts::*;
use crate::settings::GameConfig;
use crate::{aim_angle_toward, clamp_aim_angle};

/// Round lifecycle. `Won` and `Lost` are final until restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    Active,
    Won,
    Lost,
}

impl RoundState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RoundState::Active)
    }
}

/// Things that happened during a command, for sounds and animations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    Restarted { seed: u32 },
    Fired { color: BubbleColor, angle: f32 },
    WallBounce { bounces: u32 },
    Placed { cell: HexCoord, color: BubbleColor },
    /// No free cell at the contact point
    ShotWasted { color: BubbleColor },
    ClusterPopped { cells: Vec<HexCoord>, color: BubbleColor, points: u64 },
    FloatingDropped { cells: Vec<HexCoord>, points: u64 },
    RowInserted,
    Won { score: u64 },
    Lost { score: u64 },
}

/// Last contact, recorded while debug mode is on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebugProbe {
    pub contact: Contact,
    pub position: Vec2,
    pub snap: Option<HexCoord>,
}

/// Running totals for the round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    pub bubbles_popped: u32,
    pub bubbles_dropped: u32,
    pub clusters_popped: u32,
    pub shots_wasted: u32,
}

/// Complete round state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    config: GameConfig,
    rng: SequenceGenerator,
    grid: BubbleGrid,
    projectile: Option<Projectile>,
    state: RoundState,
    score: u64,
    shots: u32,
    shots_without_match: u32,
    current: BubbleColor,
    next: BubbleColor,
    /// Radians from horizontal, straight up is π/2
    aim_angle: f32,
    debug: bool,
    debug_probe: Option<DebugProbe>,
    stats: RoundStats,
    #[serde(skip)]
    events: Vec<RoundEvent>,
}

impl Round {
    /// Create a round with the given config and seed
    pub fn new(config: GameConfig, seed: u64) -> Self {
        debug_assert!(
            config.validate().is_ok(),
            "invalid round config: {:?}",
            config.validate()
        );
        let grid = BubbleGrid::new(config.rows(), config.columns);
        let mut round = Self {
            config,
            rng: SequenceGenerator::new(seed),
            grid,
            projectile: None,
            state: RoundState::Active,
            score: 0,
            shots: 0,
            shots_without_match: 0,
            current: BubbleColor(1),
            next: BubbleColor(1),
            aim_angle: DEFAULT_AIM_DEG.to_radians(),
            debug: false,
            debug_probe: None,
            stats: RoundStats::default(),
            events: Vec::new(),
        };
        round.restart(seed);
        round
    }

    /// Throw away the current round and deal a fresh one
    pub fn restart(&mut self, seed: u64) {
        self.rng.reseed(seed);
        self.grid = BubbleGrid::new(self.config.rows(), self.config.columns);
        self.projectile = None;
        self.state = RoundState::Active;
        self.score = 0;
        self.shots = 0;
        self.shots_without_match = 0;
        self.aim_angle = DEFAULT_AIM_DEG.to_radians();
        self.debug_probe = None;
        self.stats = RoundStats::default();

        for row in 0..self.config.initial_rows as i32 {
            for col in 0..self.config.columns as i32 {
                let color = self.random_color();
                self.grid.set(HexCoord::new(row, col), Some(color));
            }
        }
        self.current = self.random_color();
        self.next = self.random_color();

        log::info!(
            "Round started: seed={} difficulty={} bubbles={}",
            self.rng.seed(),
            self.config.difficulty.as_str(),
            self.grid.len()
        );
        self.events.push(RoundEvent::Restarted {
            seed: self.rng.seed(),
        });
    }

    /// Restart under a different configuration
    pub fn restart_with(&mut self, config: GameConfig, seed: u64) {
        debug_assert!(config.validate().is_ok(), "invalid round config");
        self.config = config;
        self.restart(seed);
    }

    fn random_color(&mut self) -> BubbleColor {
        let id = self.rng.next_int(1, self.config.palette_size as i64);
        BubbleColor(id as u8)
    }

    // --- Queries ---

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Geometry for the current config, rebuilt on every call
    pub fn layout(&self) -> HexLayout {
        HexLayout::from_config(&self.config)
    }

    pub fn grid(&self) -> &BubbleGrid {
        &self.grid
    }

    pub fn cell(&self, coord: HexCoord) -> Option<BubbleColor> {
        self.grid.get(coord)
    }

    pub fn current_color(&self) -> BubbleColor {
        self.current
    }

    pub fn next_color(&self) -> BubbleColor {
        self.next
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Misses left before a new row drops in
    pub fn shots_until_new_row(&self) -> u32 {
        SHOTS_PER_NEW_ROW.saturating_sub(self.shots_without_match)
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    pub fn aim_angle(&self) -> f32 {
        self.aim_angle
    }

    pub fn stats(&self) -> RoundStats {
        self.stats
    }

    pub fn seed(&self) -> u32 {
        self.rng.seed()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn debug_probe(&self) -> Option<&DebugProbe> {
        self.debug_probe.as_ref()
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Commands ---

    /// Set the aim angle (radians), clamped to the aim cone
    pub fn set_aim_angle(&mut self, angle: f32) {
        self.aim_angle = clamp_aim_angle(angle);
    }

    /// Aim toward a pointer position in canvas pixels
    pub fn aim_at(&mut self, pointer: Vec2) {
        self.aim_angle = aim_angle_toward(self.config.shooter_position(), pointer);
    }

    pub fn toggle_debug(&mut self) {
        self.debug = !self.debug;
        if !self.debug {
            self.debug_probe = None;
        }
        log::debug!("Debug mode {}", if self.debug { "on" } else { "off" });
    }

    /// Launch the current bubble. Ignored while a shot is in flight or the
    /// round is over; returns whether a shot was fired.
    pub fn fire(&mut self) -> bool {
        if self.state.is_terminal() || self.projectile.is_some() {
            return false;
        }

        let color = self.current;
        self.projectile = Some(Projectile::launch(
            self.config.shooter_position(),
            self.aim_angle,
            PROJECTILE_SPEED,
            color,
        ));
        self.current = self.next;
        self.next = self.random_color();
        self.shots += 1;

        log::debug!(
            "Shot {} fired: {} at {:.1}°",
            self.shots,
            color,
            self.aim_angle.to_degrees()
        );
        self.events.push(RoundEvent::Fired {
            color,
            angle: self.aim_angle,
        });
        true
    }

    /// Advance the simulation by `dt` seconds (clamped to `MAX_TICK_DT`)
    pub fn tick(&mut self, dt: f32) {
        if self.state.is_terminal() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(MAX_TICK_DT);
        let layout = self.layout();
        let canvas_width = self.config.canvas_width;

        let Some(projectile) = self.projectile.as_mut() else {
            return;
        };
        let result = projectile.step(dt, &self.grid, &layout, canvas_width);
        let (color, bounces) = (projectile.color, projectile.bounces);

        if result.bounced {
            self.events.push(RoundEvent::WallBounce { bounces });
        }

        let Some(resolution) = result.resolution else {
            return;
        };
        self.projectile = None;

        if self.debug {
            self.debug_probe = Some(DebugProbe {
                contact: resolution.contact,
                position: resolution.position,
                snap: resolution.snap,
            });
        }

        match resolution.snap {
            Some(cell) => self.resolve_placement(cell, color, bounces),
            None => {
                log::debug!(
                    "Shot wasted: no free cell near {:?}",
                    resolution.position
                );
                self.stats.shots_wasted += 1;
                self.events.push(RoundEvent::ShotWasted { color });
            }
        }
    }

    /// Land a bubble and apply matching, dropping, row pressure and the
    /// win/loss check. `bounces` is the landing shot's wall count.
    pub fn resolve_placement(&mut self, cell: HexCoord, color: BubbleColor, bounces: u32) {
        if self.state.is_terminal() {
            return;
        }
        let layout = self.layout();

        self.grid.set(cell, Some(color));
        log::debug!("Bubble landed at {} with {}", cell, color);
        self.events.push(RoundEvent::Placed { cell, color });

        let cluster = same_color_cluster(&self.grid, &layout, cell);
        if cluster.len() >= MIN_CLUSTER_SIZE {
            let mut cells: Vec<HexCoord> = cluster.into_iter().collect();
            cells.sort();
            for &c in &cells {
                self.grid.set(c, None);
            }

            let points = cluster_points(cells.len(), bounces);
            self.score += points;
            self.stats.bubbles_popped += cells.len() as u32;
            self.stats.clusters_popped += 1;
            log::debug!(
                "Cluster of {} {} popped, +{} points (total: {})",
                cells.len(),
                color,
                points,
                self.score
            );
            self.events.push(RoundEvent::ClusterPopped {
                cells,
                color,
                points,
            });

            let dropped = prune_floating(&mut self.grid, &layout);
            if !dropped.is_empty() {
                let points = floating_points(dropped.len(), bounces);
                self.score += points;
                self.stats.bubbles_dropped += dropped.len() as u32;
                self.events.push(RoundEvent::FloatingDropped {
                    cells: dropped,
                    points,
                });
            }

            self.shots_without_match = 0;
        } else {
            self.shots_without_match += 1;
            if self.shots_without_match >= SHOTS_PER_NEW_ROW {
                self.insert_row();
                self.shots_without_match = 0;
            }
        }

        self.evaluate_termination(&layout);
    }

    /// Shift every row down by one and fill row 0 with fresh bubbles.
    /// Whatever was in the last row falls off.
    fn insert_row(&mut self) {
        let rows = self.grid.rows() as i32;
        let cols = self.grid.cols() as i32;
        for row in (1..rows).rev() {
            for col in 0..cols {
                let above = self.grid.get(HexCoord::new(row - 1, col));
                self.grid.set(HexCoord::new(row, col), above);
            }
        }
        for col in 0..cols {
            let color = self.random_color();
            self.grid.set(HexCoord::new(0, col), Some(color));
        }
        log::info!("New row inserted (lowest row now {:?})", self.grid.lowest_row());
        self.events.push(RoundEvent::RowInserted);
    }

    fn evaluate_termination(&mut self, layout: &HexLayout) {
        if self.grid.is_empty() {
            self.state = RoundState::Won;
            log::info!("WIN! All bubbles cleared! Final score: {}", self.score);
            self.events.push(RoundEvent::Won { score: self.score });
            return;
        }

        // Row index and pixel line can disagree once rows have shifted, so
        // either one is enough to lose
        let lose_row = self.config.lose_row as i32;
        let lose_line = self.config.lose_line_y();
        let breached = self.grid.occupied().any(|(coord, _)| {
            coord.row == lose_row || layout.cell_to_pixel(coord).y >= lose_line
        });

        if breached {
            self.state = RoundState::Lost;
            self.projectile = None;
            log::info!(
                "GAME OVER! Bubbles reached the lose line. Final score: {}",
                self.score
            );
            self.events.push(RoundEvent::Lost { score: self.score });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;

    const RED: BubbleColor = BubbleColor(1);
    const BLUE: BubbleColor = BubbleColor(2);

    /// Easy round (16 × 10) with the seeded rows wiped
    fn empty_round() -> Round {
        let mut round = Round::new(GameConfig::for_difficulty(Difficulty::Easy), 1);
        round.grid = BubbleGrid::new(round.config.rows(), round.config.columns);
        round.drain_events();
        round
    }

    #[test]
    fn test_new_round_seeds_initial_rows() {
        let round = Round::new(GameConfig::for_difficulty(Difficulty::Easy), 7);
        let config = round.config();
        assert_eq!(round.grid().len(), config.initial_rows * config.columns);
        assert_eq!(round.grid().lowest_row(), Some(config.initial_rows - 1));
        for (_, color) in round.grid().occupied() {
            assert!((1..=config.palette_size).contains(&color.0));
        }
        assert_eq!(round.state(), RoundState::Active);
        assert_eq!(round.score(), 0);
        assert_eq!(round.shots_until_new_row(), SHOTS_PER_NEW_ROW);
    }

    #[test]
    fn test_same_seed_same_round() {
        let config = GameConfig::for_difficulty(Difficulty::Hard);
        let a = Round::new(config.clone(), 12345);
        let b = Round::new(config, 12345);
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.current_color(), b.current_color());
        assert_eq!(a.next_color(), b.next_color());
    }

    #[test]
    fn test_cluster_of_four_scores_forty() {
        let mut round = empty_round();
        // (5,2) sits on an odd row; (5,3), (6,2) and (4,2) all touch it
        round.grid.set(HexCoord::new(5, 2), Some(RED));
        round.grid.set(HexCoord::new(5, 3), Some(RED));
        round.grid.set(HexCoord::new(6, 2), Some(RED));

        round.resolve_placement(HexCoord::new(4, 2), RED, 0);

        assert_eq!(round.score(), 40);
        assert_eq!(round.stats().bubbles_popped, 4);
        assert_eq!(round.shots_until_new_row(), SHOTS_PER_NEW_ROW);
        // That was everything on the board
        assert!(round.grid().is_empty());
        assert_eq!(round.state(), RoundState::Won);
        let events = round.drain_events();
        assert!(events.contains(&RoundEvent::Won { score: 40 }));
    }

    #[test]
    fn test_bounce_multiplier_applies_to_cluster() {
        let mut round = empty_round();
        for col in 0..4 {
            round.grid.set(HexCoord::new(0, col), Some(RED));
        }
        // Anchored bystander so the round keeps going
        round.grid.set(HexCoord::new(0, 8), Some(BLUE));

        round.resolve_placement(HexCoord::new(0, 4), RED, 2);

        assert_eq!(round.score(), 75);
        assert_eq!(round.state(), RoundState::Active);
        assert_eq!(round.grid().len(), 1);
    }

    #[test]
    fn test_floating_bubbles_drop_with_bonus() {
        let mut round = empty_round();
        // Red pair on the ceiling holding up a blue bubble
        round.grid.set(HexCoord::new(0, 3), Some(RED));
        round.grid.set(HexCoord::new(0, 4), Some(RED));
        round.grid.set(HexCoord::new(1, 3), Some(BLUE));
        // Separate anchored bubble
        round.grid.set(HexCoord::new(0, 8), Some(BLUE));

        round.resolve_placement(HexCoord::new(0, 5), RED, 1);

        // 3 popped at 1.25x = 37, 1 dropped at 1.25x = 25
        assert_eq!(round.score(), 37 + 25);
        assert_eq!(round.stats().bubbles_dropped, 1);
        assert!(!round.grid().is_occupied(HexCoord::new(1, 3)));
        let events = round.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            RoundEvent::FloatingDropped { cells, points: 25 } if cells == &vec![HexCoord::new(1, 3)]
        )));
    }

    #[test]
    fn test_five_misses_insert_a_row() {
        let mut round = empty_round();
        let colors = [RED, BLUE, RED, BLUE, RED];
        for (col, &color) in colors.iter().enumerate() {
            assert_eq!(round.shots_until_new_row(), SHOTS_PER_NEW_ROW - col as u32);
            round.resolve_placement(HexCoord::new(0, col as i32), color, 0);
        }

        assert_eq!(round.shots_until_new_row(), SHOTS_PER_NEW_ROW);
        // Old ceiling row moved down one
        for (col, &color) in colors.iter().enumerate() {
            assert_eq!(round.cell(HexCoord::new(1, col as i32)), Some(color));
        }
        // Fresh ceiling row is full
        for col in 0..round.config().columns as i32 {
            assert!(round.grid().is_occupied(HexCoord::new(0, col)));
        }
        assert_eq!(round.state(), RoundState::Active);
        assert!(round.drain_events().contains(&RoundEvent::RowInserted));
    }

    #[test]
    fn test_row_insert_drops_last_row() {
        let mut round = empty_round();
        let last = round.config().rows() as i32 - 1;
        round.grid.set(HexCoord::new(last, 0), Some(RED));
        round.insert_row();
        assert!(!round.grid().is_occupied(HexCoord::new(last, 0)));
    }

    #[test]
    fn test_lose_row_ends_round() {
        let mut round = empty_round();
        round.grid.set(HexCoord::new(0, 0), Some(BLUE));
        let lose_row = round.config().lose_row as i32;

        round.resolve_placement(HexCoord::new(lose_row, 5), RED, 0);

        assert_eq!(round.state(), RoundState::Lost);
        assert!(round.drain_events().contains(&RoundEvent::Lost { score: 0 }));
    }

    #[test]
    fn test_lose_line_catches_rows_past_lose_row() {
        let mut round = empty_round();
        round.grid.set(HexCoord::new(0, 0), Some(BLUE));
        let below = round.config().lose_row as i32 + 1;

        round.resolve_placement(HexCoord::new(below, 5), RED, 0);

        assert_eq!(round.state(), RoundState::Lost);
    }

    #[test]
    fn test_terminal_round_ignores_commands() {
        let mut round = empty_round();
        round.grid.set(HexCoord::new(0, 0), Some(BLUE));
        round.resolve_placement(HexCoord::new(round.config().lose_row as i32, 0), RED, 0);
        assert_eq!(round.state(), RoundState::Lost);

        let shots = round.shots();
        assert!(!round.fire());
        assert_eq!(round.shots(), shots);
        round.tick(0.05);
        assert!(round.projectile().is_none());

        let before = round.grid().clone();
        round.resolve_placement(HexCoord::new(3, 3), RED, 0);
        assert_eq!(round.grid(), &before);
    }

    #[test]
    fn test_fire_promotes_queue_and_blocks_second_shot() {
        let mut round = Round::new(GameConfig::default(), 99);
        let (current, next) = (round.current_color(), round.next_color());

        assert!(round.fire());
        assert_eq!(round.shots(), 1);
        assert_eq!(round.current_color(), next);
        let projectile = round.projectile().expect("projectile in flight");
        assert_eq!(projectile.color, current);
        assert_eq!(projectile.pos, round.config().shooter_position());

        // Still in flight
        assert!(!round.fire());
        assert_eq!(round.shots(), 1);
    }

    #[test]
    fn test_shot_flies_up_and_lands_next_to_ceiling_bubbles() {
        let mut round = empty_round();
        let fired = round.current_color();
        let other = BubbleColor(fired.0 % round.config().palette_size + 1);
        round.grid.set(HexCoord::new(0, 4), Some(other));
        round.grid.set(HexCoord::new(0, 5), Some(other));
        round.toggle_debug();

        round.set_aim_angle(std::f32::consts::FRAC_PI_2);
        assert!(round.fire());
        for _ in 0..1000 {
            if round.projectile().is_none() {
                break;
            }
            round.tick(SIM_DT);
        }

        assert!(round.projectile().is_none(), "shot never landed");
        // Straight up from x=210 grazes (0,5) and tucks in below, at (1,4)
        assert_eq!(round.cell(HexCoord::new(1, 4)), Some(fired));
        let probe = round.debug_probe().expect("debug probe recorded");
        assert_eq!(probe.contact, Contact::Bubble(HexCoord::new(0, 5)));
        assert_eq!(probe.snap, Some(HexCoord::new(1, 4)));
        assert_eq!(round.shots_until_new_row(), SHOTS_PER_NEW_ROW - 1);
    }

    #[test]
    fn test_zero_tick_after_bounce_changes_nothing() {
        let mut round = empty_round();
        round.set_aim_angle(MIN_AIM_DEG.to_radians());
        assert!(round.fire());
        for _ in 0..200 {
            if round.projectile().is_none_or(|p| p.bounces > 0) {
                break;
            }
            round.tick(SIM_DT);
        }
        let before = round.projectile().cloned().expect("still in flight");
        assert_eq!(before.bounces, 1);

        round.tick(0.0);
        assert_eq!(round.projectile(), Some(&before));
        round.tick(SIM_DT);
        assert_eq!(round.projectile().map(|p| p.bounces), Some(1));
    }

    #[test]
    fn test_aim_is_clamped() {
        let mut round = empty_round();
        round.set_aim_angle(0.0);
        assert!((round.aim_angle() - MIN_AIM_DEG.to_radians()).abs() < 1e-6);
        round.set_aim_angle(std::f32::consts::PI);
        assert!((round.aim_angle() - MAX_AIM_DEG.to_radians()).abs() < 1e-6);

        let shooter = round.config().shooter_position();
        round.aim_at(shooter - Vec2::new(0.0, 100.0));
        assert!((round.aim_angle() - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut round = empty_round();
        round.grid.set(HexCoord::new(0, 0), Some(BLUE));
        round.resolve_placement(HexCoord::new(round.config().lose_row as i32, 0), RED, 0);
        assert_eq!(round.state(), RoundState::Lost);

        round.restart(2024);
        assert_eq!(round.state(), RoundState::Active);
        assert_eq!(round.score(), 0);
        assert_eq!(round.shots(), 0);
        assert_eq!(round.seed(), 2024);
        assert_eq!(round.stats(), RoundStats::default());
        assert!(round.projectile().is_none());
        assert_eq!(*round.grid(), *Round::new(GameConfig::default(), 2024).grid());
        assert!(round
            .drain_events()
            .contains(&RoundEvent::Restarted { seed: 2024 }));
    }

    #[test]
    fn test_restart_with_new_config_rebuilds_grid() {
        let mut round = Round::new(GameConfig::for_difficulty(Difficulty::Easy), 3);
        round.restart_with(GameConfig::for_difficulty(Difficulty::Hard), 3);
        assert_eq!(round.grid().cols(), 14);
        assert_eq!(round.grid().rows(), 20);
        assert_eq!(round.layout().radius, 16.0);
    }

    #[test]
    fn test_debug_toggle_clears_probe() {
        let mut round = empty_round();
        assert!(!round.debug());
        round.toggle_debug();
        assert!(round.debug());
        round.debug_probe = Some(DebugProbe {
            contact: Contact::Ceiling,
            position: Vec2::ZERO,
            snap: None,
        });
        round.toggle_debug();
        assert!(!round.debug());
        assert!(round.debug_probe().is_none());
    }

    #[test]
    fn test_round_serializes() {
        let round = Round::new(GameConfig::default(), 5);
        let json = serde_json::to_string(&round).unwrap();
        let back: Round = serde_json::from_str(&json).unwrap();
        assert_eq!(back.grid(), round.grid());
        assert_eq!(back.score(), round.score());
        assert_eq!(back.current_color(), round.current_color());
    }
}
