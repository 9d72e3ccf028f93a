//! The moving circle ("ball") and its per-tick update

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{COLOR_MAX, COLOR_MIN};

/// Axis-aligned arena the entities bounce inside, origin at top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True if a circle at `pos` with `radius` lies fully inside
    pub fn contains_circle(&self, pos: Vec2, radius: f32) -> bool {
        pos.x >= radius
            && pos.x <= self.width - radius
            && pos.y >= radius
            && pos.y <= self.height - radius
    }
}

/// A data-driven ball
///
/// `speed` is fixed at creation; collisions and wall bounces only change
/// the direction of `vel`, so `vel.length() == speed` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionEntity {
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    pub diameter: f32,
    pub radius: f32,
    speed: f32,
    pub color: [u8; 3],
    /// Per-channel step, each in {-1, 0, 1}
    pub color_dir: [i8; 3],
}

impl MotionEntity {
    /// Create an entity heading along `angle` (radians) at `speed`
    pub fn new(
        pos: Vec2,
        diameter: f32,
        speed: f32,
        angle: f32,
        color: [u8; 3],
        color_dir: [i8; 3],
    ) -> Self {
        Self {
            pos,
            vel: crate::polar_to_cartesian(speed, angle),
            diameter,
            radius: diameter / 2.0,
            speed,
            color: color.map(|c| c.max(COLOR_MIN)),
            color_dir: color_dir.map(|d| d.signum()),
        }
    }

    /// Speed magnitude assigned at creation
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Point the velocity along the unit vector `dir`, keeping the fixed speed
    #[inline]
    pub fn set_direction(&mut self, dir: Vec2) {
        self.vel = dir * self.speed;
    }

    /// Advance one tick: move, bounce off walls, fade color
    pub fn update(&mut self, bounds: &Bounds) {
        self.pos += self.vel;
        self.reflect_walls(bounds);
        self.step_color();
    }

    /// Clamp inside the arena and point the velocity inward on any wall hit
    fn reflect_walls(&mut self, bounds: &Bounds) {
        let r = self.radius;

        if self.pos.x - r < 0.0 {
            self.vel.x = self.vel.x.abs();
            self.pos.x = r;
        } else if self.pos.x + r > bounds.width {
            self.vel.x = -self.vel.x.abs();
            self.pos.x = bounds.width - r;
        }

        if self.pos.y - r < 0.0 {
            self.vel.y = self.vel.y.abs();
            self.pos.y = r;
        } else if self.pos.y + r > bounds.height {
            self.vel.y = -self.vel.y.abs();
            self.pos.y = bounds.height - r;
        }
    }

    /// Step each channel; a channel that would leave the range reverses
    /// direction and is clamped this tick
    fn step_color(&mut self) {
        for (channel, dir) in self.color.iter_mut().zip(self.color_dir.iter_mut()) {
            let next = i16::from(*channel) + i16::from(*dir);
            if next < i16::from(COLOR_MIN) || next > i16::from(COLOR_MAX) {
                *dir = -*dir;
            }
            *channel = next.clamp(i16::from(COLOR_MIN), i16::from(COLOR_MAX)) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_4, PI};

    const BOUNDS: Bounds = Bounds {
        width: 1920.0,
        height: 1080.0,
    };

    fn entity_at(pos: Vec2, angle: f32) -> MotionEntity {
        MotionEntity::new(pos, 20.0, 5.0, angle, [100, 100, 100], [0, 0, 0])
    }

    #[test]
    fn test_update_moves_by_velocity() {
        let mut e = entity_at(Vec2::new(500.0, 500.0), 0.0);
        e.update(&BOUNDS);
        assert!((e.pos.x - 505.0).abs() < 1e-4);
        assert!((e.pos.y - 500.0).abs() < 1e-4);
    }

    #[test]
    fn test_left_wall_reflects_and_clamps() {
        let mut e = entity_at(Vec2::new(12.0, 500.0), PI);
        e.update(&BOUNDS);
        assert_eq!(e.pos.x, e.radius);
        assert!(e.vel.x > 0.0);
        assert!((e.vel.length() - e.speed()).abs() < 1e-4);
    }

    #[test]
    fn test_corner_reflects_both_axes() {
        let mut e = entity_at(Vec2::new(1908.0, 1068.0), FRAC_PI_4);
        e.update(&BOUNDS);
        assert_eq!(e.pos.x, 1920.0 - e.radius);
        assert_eq!(e.pos.y, 1080.0 - e.radius);
        assert!(e.vel.x < 0.0 && e.vel.y < 0.0);
        assert!((e.vel.length() - e.speed()).abs() < 1e-4);
    }

    #[test]
    fn test_inward_velocity_is_not_flipped_again() {
        // Already clamped against the wall and heading away from it
        let mut e = entity_at(Vec2::new(10.0, 500.0), 0.0);
        e.update(&BOUNDS);
        assert!(e.vel.x > 0.0);
        assert!(e.pos.x > 10.0);
    }

    #[test]
    fn test_color_reverses_at_bounds() {
        let mut e = MotionEntity::new(
            Vec2::new(500.0, 500.0),
            20.0,
            1.0,
            0.0,
            [255, 50, 120],
            [1, -1, 0],
        );
        e.update(&BOUNDS);
        assert_eq!(e.color, [255, 50, 120]);
        assert_eq!(e.color_dir, [-1, 1, 0]);
        e.update(&BOUNDS);
        assert_eq!(e.color, [254, 51, 120]);
    }

    #[test]
    fn test_new_sanitizes_color_inputs() {
        let e = MotionEntity::new(Vec2::ZERO, 10.0, 1.0, 0.0, [0, 200, 255], [5, -3, 0]);
        assert_eq!(e.color, [50, 200, 255]);
        assert_eq!(e.color_dir, [1, -1, 0]);
        assert_eq!(e.radius, 5.0);
    }

    #[test]
    fn test_set_direction_keeps_speed() {
        let mut e = entity_at(Vec2::new(500.0, 500.0), 0.0);
        e.set_direction(Vec2::new(0.6, -0.8));
        assert!((e.vel.length() - 5.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn invariants_hold_over_many_ticks(
            x in 100.0f32..1820.0,
            y in 100.0f32..980.0,
            diameter in 10.0f32..=200.0,
            speed in prop::sample::select(vec![5.0f32, 4.25, 3.5, 2.75, 2.0, 1.25, 0.5, 0.25]),
            angle in 0.0f32..std::f32::consts::TAU,
            color in prop::array::uniform3(50u8..=255),
            dir in prop::array::uniform3(-1i8..=1),
        ) {
            let mut e = MotionEntity::new(Vec2::new(x, y), diameter, speed, angle, color, dir);
            for _ in 0..2000 {
                e.update(&BOUNDS);
                prop_assert!(BOUNDS.contains_circle(e.pos, e.radius), "escaped at {:?}", e.pos);
                prop_assert!((e.vel.length() - speed).abs() < 1e-3);
                for c in e.color {
                    prop_assert!((COLOR_MIN..=COLOR_MAX).contains(&c));
                }
            }
        }
    }
}
