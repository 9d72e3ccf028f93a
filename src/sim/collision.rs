//! Ball-ball collision detection and response
//!
//! The response only rewrites headings: both balls are sent apart along the
//! line between their centers, each at its own fixed speed. There is no
//! momentum exchange and no positional separation, so overlapping balls
//! may collide again on following ticks until they drift apart.

use glam::Vec2;

use super::entity::MotionEntity;

/// True if the two circles overlap (touching does not count)
#[inline]
pub fn overlaps(a: &MotionEntity, b: &MotionEntity) -> bool {
    a.pos.distance(b.pos) < a.radius + b.radius
}

/// Resolve a single pair; returns whether they collided
pub fn resolve_pair(a: &mut MotionEntity, b: &mut MotionEntity) -> bool {
    if !overlaps(a, b) {
        return false;
    }

    let delta = b.pos - a.pos;
    let angle = delta.y.atan2(delta.x);
    let axis = Vec2::new(angle.cos(), angle.sin());
    a.set_direction(-axis);
    b.set_direction(axis);
    true
}

/// Resolve every unordered pair `(i, j)` with `i < j`, in index order.
/// Returns the number of colliding pairs.
pub fn resolve_all(entities: &mut [MotionEntity]) -> usize {
    let mut hits = 0;
    for i in 0..entities.len() {
        let (head, tail) = entities.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if resolve_pair(a, b) {
                hits += 1;
            }
        }
    }
    hits
}
