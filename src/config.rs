/// Command-line configuration and the errors raised while validating it.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::entities::Bounds;

/// Smallest terminal that still fits the HUD, border and a few rows of play.
pub const MIN_COLUMNS: u16 = 20;
pub const MIN_ROWS: u16 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("frame rate must be at least 1 fps")]
    ZeroFps,
    #[error("cell scale must be a positive number of world units, got {0}")]
    InvalidCellScale(f32),
    #[error("playfield must be finite and positive, got {width} x {height}")]
    InvalidBounds { width: f32, height: f32 },
    #[error("terminal is {columns}x{rows}; need at least {}x{}", MIN_COLUMNS, MIN_ROWS)]
    TerminalTooSmall { columns: u16, rows: u16 },
}

#[derive(Clone, Debug, Parser)]
#[command(name = "space_invaders", about = "Terminal invaders: hold the line against descending formations")]
pub struct Config {
    /// Simulation steps per second.
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Seed for formation sizes, fire choices and spawn intervals.
    #[arg(long)]
    pub seed: Option<u64>,

    /// World units covered by one terminal column.
    #[arg(long, default_value_t = 10.0)]
    pub col_units: f32,

    /// World units covered by one terminal row.
    #[arg(long, default_value_t = 15.0)]
    pub row_units: f32,

    /// Where log output goes.  Defaults to `space_invaders.log` in the
    /// system temp directory.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter, in `RUST_LOG` syntax.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fps: 60,
            seed: None,
            col_units: 10.0,
            row_units: 15.0,
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        for scale in [self.col_units, self.row_units] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ConfigError::InvalidCellScale(scale));
            }
        }
        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("space_invaders.log"))
    }

    /// World bounds for a terminal of `columns` × `rows`.  One row of HUD,
    /// the border, and the controls hint are not part of the playfield.
    pub fn playfield(&self, columns: u16, rows: u16) -> Result<Bounds, ConfigError> {
        if columns < MIN_COLUMNS || rows < MIN_ROWS {
            return Err(ConfigError::TerminalTooSmall { columns, rows });
        }
        let inner_cols = columns.saturating_sub(2);
        let inner_rows = rows.saturating_sub(4);
        Bounds::new(
            inner_cols as f32 * self.col_units,
            inner_rows as f32 * self.row_units,
        )
    }
}
