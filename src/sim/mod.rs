//! Deterministic simulation module
//!
//! All motion logic lives here:
//! - Fixed timestep only, velocities in pixels per tick
//! - Randomness only through a caller-supplied RNG (entity spawning)
//! - Stable iteration order (population index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod factory;
pub mod state;
pub mod tick;

pub use collision::{overlaps, resolve_all, resolve_pair};
pub use entity::{Bounds, MotionEntity};
pub use factory::{diameter_for_amount, spawn_entity, spawn_population, speed_for_age};
pub use state::{Population, SimulationState};
pub use tick::{TickStats, tick};
