//! Fixed timestep simulation tick
//!
//! One tick = reload check, motion + walls + color for every entity, then
//! collision response over every pair. Velocities are in pixels per tick.

use super::collision::resolve_all;
use super::state::SimulationState;

/// What happened during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// A new population was swapped in at the start of this tick
    pub reloaded: bool,
    /// Overlapping pairs resolved this tick
    pub collisions: usize,
}

/// Advance the simulation by one tick
pub fn tick(state: &mut SimulationState) -> TickStats {
    let reloaded = state.apply_pending_reload();

    let bounds = state.bounds;
    for entity in &mut state.population.entities {
        entity.update(&bounds);
    }

    let collisions = resolve_all(&mut state.population.entities);
    state.time_ticks += 1;

    TickStats {
        reloaded,
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Bounds, MotionEntity, Population};
    use glam::Vec2;
    use proptest::prelude::*;

    fn ball(x: f32, y: f32, diameter: f32, speed: f32, angle: f32) -> MotionEntity {
        MotionEntity::new(Vec2::new(x, y), diameter, speed, angle, [120; 3], [1, -1, 0])
    }

    #[test]
    fn test_tick_counts_and_moves() {
        let population = Population::new(0, vec![ball(500.0, 500.0, 20.0, 5.0, 0.0)]);
        let mut state = SimulationState::new(Bounds::new(1920.0, 1080.0), population);

        let stats = tick(&mut state);
        assert_eq!(state.time_ticks, 1);
        assert_eq!(stats, TickStats::default());
        assert!((state.population.entities[0].pos.x - 505.0).abs() < 1e-4);
    }

    #[test]
    fn test_collision_runs_after_motion() {
        // 30px apart, closing at 2px/tick each: overlap (sum of radii 30)
        // only after both have moved this tick
        let population = Population::new(
            0,
            vec![
                ball(500.0, 500.0, 30.0, 2.0, 0.0),
                ball(530.0, 500.0, 30.0, 2.0, std::f32::consts::PI),
            ],
        );
        let mut state = SimulationState::new(Bounds::new(1920.0, 1080.0), population);

        let stats = tick(&mut state);
        assert_eq!(stats.collisions, 1);
        let [a, b] = &state.population.entities[..] else {
            panic!("expected two balls");
        };
        assert!(a.vel.x < 0.0);
        assert!(b.vel.x > 0.0);
    }

    #[test]
    fn test_reload_is_applied_before_update() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut state = SimulationState::new(
            Bounds::new(1920.0, 1080.0),
            Population::new(0, vec![ball(500.0, 500.0, 20.0, 5.0, 0.0)]),
        )
        .with_reloads(rx);

        tx.send(Population::new(1, vec![ball(100.0, 100.0, 20.0, 1.0, 0.0)]))
            .unwrap();
        let stats = tick(&mut state);
        assert!(stats.reloaded);
        assert_eq!(state.population.generation, 1);
        // The new population has already been advanced once
        assert!((state.population.entities[0].pos.x - 101.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn crowded_population_keeps_invariants(
            seeds in prop::collection::vec(
                (100.0f32..1820.0, 100.0f32..980.0, 10.0f32..=200.0, 0usize..8, 0.0f32..std::f32::consts::TAU),
                1..40,
            )
        ) {
            let speeds = crate::consts::SPEED_FACTORS;
            let entities = seeds
                .iter()
                .map(|&(x, y, d, s, a)| ball(x, y, d, speeds[s], a))
                .collect::<Vec<_>>();
            let expected: Vec<f32> = entities.iter().map(|e| e.speed()).collect();
            let mut state = SimulationState::new(
                Bounds::new(1920.0, 1080.0),
                Population::new(0, entities),
            );

            for _ in 0..300 {
                tick(&mut state);
                for (e, speed) in state.population.entities.iter().zip(&expected) {
                    prop_assert!((e.vel.length() - speed).abs() < 1e-3);
                    prop_assert!(state.bounds.contains_circle(e.pos, e.radius));
                    prop_assert!(e.color.iter().all(|c| (50..=255).contains(c)));
                }
            }
        }
    }
}
