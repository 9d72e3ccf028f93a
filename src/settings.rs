//! Simulation settings
//!
//! Defaults reproduce the built-in constants. A JSON file can override any
//! subset of fields; the command line overrides the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// CSV file backing the population
    pub data_path: PathBuf,

    // === Arena ===
    pub width: u32,
    pub height: u32,
    /// Target ticks per second
    pub fps: u32,

    // === Size mapping ===
    pub min_diameter: f32,
    pub max_diameter: f32,
    pub min_amount: f64,
    pub max_amount: f64,

    // === Speed mapping ===
    /// Maximum record age in days
    pub date_range: i64,
    /// Speed per age in days; needs `date_range + 1` entries
    pub speed_factors: Vec<f32>,

    /// Spawn inset from every wall
    pub spawn_margin: f32,
    /// RNG seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DATA_PATH),

            width: WIDTH,
            height: HEIGHT,
            fps: FPS,

            min_diameter: MIN_DIAMETER,
            max_diameter: MAX_DIAMETER,
            min_amount: MIN_AMOUNT,
            max_amount: MAX_AMOUNT,

            date_range: DATE_RANGE,
            speed_factors: SPEED_FACTORS.to_vec(),

            spawn_margin: SPAWN_MARGIN,
            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| SettingsError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Check that the settings describe a usable simulation
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: String| Err(SettingsError::Invalid(msg));

        if self.width == 0 || self.height == 0 {
            return invalid(format!("arena size {}x{} is empty", self.width, self.height));
        }
        if self.fps == 0 {
            return invalid("fps must be positive".into());
        }
        if !(self.min_diameter > 0.0 && self.min_diameter < self.max_diameter) {
            return invalid(format!(
                "diameter range {}..{} is not increasing",
                self.min_diameter, self.max_diameter
            ));
        }
        if !(self.min_amount < self.max_amount) {
            return invalid(format!(
                "amount range {}..{} is not increasing",
                self.min_amount, self.max_amount
            ));
        }
        if self.date_range < 0 {
            return invalid(format!("date range {} is negative", self.date_range));
        }
        if self.speed_factors.len() as i64 != self.date_range + 1 {
            return invalid(format!(
                "expected {} speed factors, got {}",
                self.date_range + 1,
                self.speed_factors.len()
            ));
        }
        if self.speed_factors.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return invalid("speed factors must be finite and non-negative".into());
        }
        if self.max_diameter > self.width as f32 || self.max_diameter > self.height as f32 {
            return invalid(format!(
                "arena {}x{} cannot hold a {}px ball",
                self.width, self.height, self.max_diameter
            ));
        }
        if self.spawn_margin < self.max_diameter / 2.0 {
            return invalid(format!(
                "spawn margin {} is smaller than the largest radius {}",
                self.spawn_margin,
                self.max_diameter / 2.0
            ));
        }
        if 2.0 * self.spawn_margin > self.width as f32
            || 2.0 * self.spawn_margin > self.height as f32
        {
            return invalid(format!("spawn margin {} does not fit", self.spawn_margin));
        }
        Ok(())
    }
}
