//! Difficulty tiers and the per-round configuration they resolve to
//!
//! A `GameConfig` is captured when a round is built and stays fixed for that
//! round. Geometry derived from it (row height, lose line, shooter position)
//! is recomputed on every call.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::BUFFER_ROWS;

/// Difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Bubble radius in pixels
    pub fn radius(&self) -> f32 {
        match self {
            Difficulty::Easy => 20.0,
            Difficulty::Medium => 18.0,
            Difficulty::Hard => 16.0,
        }
    }

    /// Grid columns
    pub fn columns(&self) -> usize {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 12,
            Difficulty::Hard => 14,
        }
    }

    /// Playfield rows, not counting the buffer
    pub fn visible_rows(&self) -> usize {
        match self {
            Difficulty::Easy => 14,
            Difficulty::Medium => 16,
            Difficulty::Hard => 18,
        }
    }

    /// Row index that ends the round once occupied
    pub fn lose_row(&self) -> usize {
        self.visible_rows() - 1
    }

    /// Number of distinct bubble colors
    pub fn palette_size(&self) -> u8 {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 5,
            Difficulty::Hard => 6,
        }
    }

    /// Rows filled at round start
    pub fn initial_rows(&self) -> usize {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 5,
            Difficulty::Hard => 6,
        }
    }
}

/// Canvas height shared by every tier
pub const CANVAS_HEIGHT: f32 = 640.0;

/// Reasons a configuration can't drive a round
#[derive(Debug)]
pub enum ConfigError {
    NonPositiveRadius(f32),
    NoColumns,
    NoRows,
    LoseRowOutOfRange { lose_row: usize, rows: usize },
    EmptyPalette,
    TooManyInitialRows { initial_rows: usize, rows: usize },
    CanvasTooNarrow { width: f32, needed: f32 },
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveRadius(r) => write!(f, "bubble radius must be positive, got {r}"),
            ConfigError::NoColumns => write!(f, "grid needs at least one column"),
            ConfigError::NoRows => write!(f, "grid needs at least one visible row"),
            ConfigError::LoseRowOutOfRange { lose_row, rows } => {
                write!(f, "lose row {lose_row} is outside a grid of {rows} rows")
            }
            ConfigError::EmptyPalette => write!(f, "palette needs at least one color"),
            ConfigError::TooManyInitialRows { initial_rows, rows } => {
                write!(f, "{initial_rows} initial rows don't fit in {rows} rows")
            }
            ConfigError::CanvasTooNarrow { width, needed } => {
                write!(f, "canvas width {width} is narrower than the grid ({needed})")
            }
            ConfigError::Json(e) => write!(f, "invalid config json: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Resolved configuration for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Tier this config was resolved from (informational)
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Bubble radius in pixels
    pub radius: f32,
    /// Grid columns
    pub columns: usize,
    /// Playfield rows (buffer rows are added on top)
    pub visible_rows: usize,
    /// Row index that ends the round once occupied
    pub lose_row: usize,
    /// Number of distinct colors (ids 1..=palette_size)
    pub palette_size: u8,
    /// Rows seeded at round start
    pub initial_rows: usize,
    /// Canvas size in pixels
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}

impl GameConfig {
    /// Resolve a difficulty tier into concrete values
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let radius = difficulty.radius();
        let columns = difficulty.columns();
        Self {
            difficulty,
            radius,
            columns,
            visible_rows: difficulty.visible_rows(),
            lose_row: difficulty.lose_row(),
            palette_size: difficulty.palette_size(),
            initial_rows: difficulty.initial_rows(),
            canvas_width: Self::grid_width(radius, columns),
            canvas_height: CANVAS_HEIGHT,
        }
    }

    /// Pixel width of a grid whose odd rows are shifted by one radius
    pub fn grid_width(radius: f32, columns: usize) -> f32 {
        columns as f32 * 2.0 * radius + radius
    }

    /// Total rows including the buffer
    #[inline]
    pub fn rows(&self) -> usize {
        self.visible_rows + BUFFER_ROWS
    }

    /// Vertical distance between row centers
    #[inline]
    pub fn row_height(&self) -> f32 {
        self.radius * 3f32.sqrt()
    }

    /// Where projectiles spawn
    pub fn shooter_position(&self) -> Vec2 {
        Vec2::new(self.canvas_width / 2.0, self.canvas_height - 2.0 * self.radius)
    }

    /// Pixel y at or below which an occupied cell loses the round
    pub fn lose_line_y(&self) -> f32 {
        (self.lose_row + 1) as f32 * self.row_height()
    }

    /// Check the constraints a round relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius(self.radius));
        }
        if self.columns == 0 {
            return Err(ConfigError::NoColumns);
        }
        if self.visible_rows == 0 {
            return Err(ConfigError::NoRows);
        }
        if self.lose_row >= self.rows() {
            return Err(ConfigError::LoseRowOutOfRange {
                lose_row: self.lose_row,
                rows: self.rows(),
            });
        }
        if self.palette_size == 0 {
            return Err(ConfigError::EmptyPalette);
        }
        if self.initial_rows > self.rows() {
            return Err(ConfigError::TooManyInitialRows {
                initial_rows: self.initial_rows,
                rows: self.rows(),
            });
        }
        let needed = Self::grid_width(self.radius, self.columns);
        if self.canvas_width < needed {
            return Err(ConfigError::CanvasTooNarrow {
                width: self.canvas_width,
                needed,
            });
        }
        Ok(())
    }

    /// Parse and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded {} config: r={} cols={} rows={}",
            config.difficulty.as_str(),
            config.radius,
            config.columns,
            config.rows()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
