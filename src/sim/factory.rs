//! Turns loaded records into freshly spawned entities

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::entity::MotionEntity;
use crate::consts::{COLOR_MAX, COLOR_MIN};
use crate::loader::SourceRecord;
use crate::settings::Settings;

/// Ball diameter for an amount, linear between the configured ranges and
/// clamped to `[min_diameter, max_diameter]`
pub fn diameter_for_amount(amount: f64, settings: &Settings) -> f32 {
    crate::remap_clamped(
        amount,
        settings.min_amount,
        settings.max_amount,
        settings.min_diameter,
        settings.max_diameter,
    )
}

/// Fixed speed for a record age; ages outside the table clamp to its ends
pub fn speed_for_age(age_days: i64, settings: &Settings) -> f32 {
    let last = settings.speed_factors.len().saturating_sub(1);
    let idx = age_days.clamp(0, settings.date_range.max(0)) as usize;
    settings
        .speed_factors
        .get(idx.min(last))
        .copied()
        .unwrap_or_default()
}

/// Spawn one entity with a random position, heading and color
pub fn spawn_entity<R: Rng>(
    record: &SourceRecord,
    settings: &Settings,
    rng: &mut R,
) -> MotionEntity {
    let diameter = diameter_for_amount(record.amount, settings);
    let speed = speed_for_age(record.age_days, settings);

    let margin = settings.spawn_margin;
    let x = rng.random_range(margin..=settings.width as f32 - margin);
    let y = rng.random_range(margin..=settings.height as f32 - margin);
    let angle = rng.random_range(0.0..TAU);

    let color = [(); 3].map(|_| rng.random_range(COLOR_MIN..=COLOR_MAX));
    let color_dir = [(); 3].map(|_| rng.random_range(-1i8..=1));

    MotionEntity::new(Vec2::new(x, y), diameter, speed, angle, color, color_dir)
}

/// Spawn one entity per record, preserving record order
pub fn spawn_population<R: Rng>(
    records: &[SourceRecord],
    settings: &Settings,
    rng: &mut R,
) -> Vec<MotionEntity> {
    records
        .iter()
        .map(|record| spawn_entity(record, settings, rng))
        .collect()
}
