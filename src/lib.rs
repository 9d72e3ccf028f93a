//! Data Balls - animated circles driven by a live CSV file
//!
//! Core modules:
//! - `loader`: CSV ingest into dated amounts
//! - `sim`: Deterministic simulation (entities, collisions, population swaps)
//! - `watcher`: File-change notifications that rebuild the population
//! - `renderer`: Canvas abstraction, native window and software frame buffer
//! - `app`: Fixed-rate render/simulation loop
//! - `settings`: Layered configuration

pub mod app;
pub mod loader;
pub mod pipeline;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod watcher;

pub use loader::{LoadReport, RowError, SourceLoadError, SourceRecord, load_records};
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Simulation configuration constants (defaults for `Settings`)
pub mod consts {
    /// Arena dimensions in pixels
    pub const WIDTH: u32 = 1920;
    pub const HEIGHT: u32 = 1080;
    /// Target ticks per second
    pub const FPS: u32 = 60;

    /// Diameter in pixels for the largest amount
    pub const MAX_DIAMETER: f32 = 200.0;
    /// Diameter in pixels for the smallest amount
    pub const MIN_DIAMETER: f32 = 10.0;
    /// Amount corresponding to MAX_DIAMETER
    pub const MAX_AMOUNT: f64 = 5_000_000.0;
    /// Amount corresponding to MIN_DIAMETER
    pub const MIN_AMOUNT: f64 = 1_000.0;

    /// Records older than this many days are excluded
    pub const DATE_RANGE: i64 = 7;
    /// Speed (pixels per tick) indexed by age in days, fresher is faster
    pub const SPEED_FACTORS: [f32; 8] = [5.0, 4.25, 3.5, 2.75, 2.0, 1.25, 0.5, 0.25];

    /// Spawn inset from every wall; at least MAX_DIAMETER / 2
    pub const SPAWN_MARGIN: f32 = 100.0;

    /// Color channel bounds
    pub const COLOR_MIN: u8 = 50;
    pub const COLOR_MAX: u8 = 255;

    /// Default data file, relative to the working directory
    pub const DATA_PATH: &str = "balls_data.csv";
}

/// Unit vector for an angle in radians, scaled by `magnitude`
#[inline]
pub fn polar_to_cartesian(magnitude: f32, theta: f32) -> Vec2 {
    Vec2::new(magnitude * theta.cos(), magnitude * theta.sin())
}

/// Linear map of `value` from `[in_min, in_max]` to `[out_min, out_max]`,
/// clamped on the output only
#[inline]
pub fn remap_clamped(value: f64, in_min: f64, in_max: f64, out_min: f32, out_max: f32) -> f32 {
    let ratio = (value - in_min) / (in_max - in_min);
    let mapped = ratio * f64::from(out_max - out_min) + f64::from(out_min);
    (mapped as f32).clamp(out_min, out_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_polar_to_cartesian() {
        let v = polar_to_cartesian(2.0, PI / 2.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 2.0).abs() < 1e-5);
        assert!((v.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_remap_clamped_saturates() {
        assert_eq!(remap_clamped(-1e12, 0.0, 1.0, 10.0, 200.0), 10.0);
        assert_eq!(remap_clamped(1e12, 0.0, 1.0, 10.0, 200.0), 200.0);
        assert!((remap_clamped(0.5, 0.0, 1.0, 0.0, 100.0) - 50.0).abs() < 1e-4);
    }
}
