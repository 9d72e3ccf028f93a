//! Fixed-rate render/simulation loop
//!
//! Each frame: drain canvas events, tick the simulation (which first swaps
//! in any reloaded population), draw, present, then sleep to hold the rate.

use std::thread;
use std::time::{Duration, Instant};

use crate::renderer::{Canvas, CanvasEvent, RenderError, draw_population};
use crate::sim::{SimulationState, tick};

/// Paces frames to a target rate
#[derive(Debug)]
pub struct FrameClock {
    period: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    /// A clock that never sleeps (tests, offline rendering)
    pub fn unthrottled() -> Self {
        Self {
            period: Duration::ZERO,
            next: Instant::now(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleep until the next frame is due.
    ///
    /// A frame that overruns by more than a whole period resets the
    /// schedule instead of trying to catch up.
    pub fn wait(&mut self) {
        if self.period.is_zero() {
            return;
        }
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
            self.next += self.period;
        } else if now - self.next > self.period {
            self.next = now + self.period;
        } else {
            self.next += self.period;
        }
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub reloads: u64,
    pub collisions: u64,
}

/// Run until the canvas asks to close.
///
/// Only a presentation failure ends the loop with an error.
pub fn run<C: Canvas + ?Sized>(
    state: &mut SimulationState,
    canvas: &mut C,
    clock: &mut FrameClock,
) -> Result<RunSummary, RenderError> {
    let mut summary = RunSummary::default();
    // Roughly once per second of wall time
    let stats_every = ((1.0 / clock.period().as_secs_f64().max(1e-3)).round() as u64).max(1);
    let mut window_collisions = 0u64;

    log::info!("Simulation started with {} balls", state.population.len());

    'frames: loop {
        for event in canvas.poll_events() {
            match event {
                CanvasEvent::CloseRequested => break 'frames,
                CanvasEvent::Resized { width, height } => {
                    log::debug!("Canvas resized to {width}x{height}");
                }
            }
        }

        let stats = tick(state);
        if stats.reloaded {
            summary.reloads += 1;
        }
        summary.collisions += stats.collisions as u64;
        window_collisions += stats.collisions as u64;

        draw_population(canvas, &state.population);
        canvas.present()?;
        summary.frames += 1;

        if summary.frames % stats_every == 0 {
            log::debug!(
                "tick {}: {} balls, {} collisions in the last {} ticks",
                state.time_ticks,
                state.population.len(),
                window_collisions,
                stats_every
            );
            window_collisions = 0;
        }

        clock.wait();
    }

    log::info!(
        "Simulation stopped after {} frames ({} reloads)",
        summary.frames,
        summary.reloads
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::FrameBuffer;
    use crate::sim::{Bounds, MotionEntity, Population};
    use glam::Vec2;

    fn state_with_one_ball() -> SimulationState {
        let ball = MotionEntity::new(Vec2::new(400.0, 300.0), 40.0, 5.0, 0.0, [200; 3], [0; 3]);
        SimulationState::new(Bounds::new(800.0, 600.0), Population::new(0, vec![ball]))
    }

    #[test]
    fn test_run_stops_on_close() {
        let mut state = state_with_one_ball();
        let mut canvas = FrameBuffer::new(800, 600).with_frame_limit(10);
        let summary = run(&mut state, &mut canvas, &mut FrameClock::unthrottled()).unwrap();

        assert_eq!(summary.frames, 10);
        assert_eq!(state.time_ticks, 10);
        assert_eq!(canvas.frames_presented(), 10);
        // Ball moved 50px right and was drawn there
        let pos = state.population.entities[0].pos;
        assert!((pos.x - 450.0).abs() < 1e-3);
        assert_eq!(
            canvas.presented()[300 * 800 + 450],
            crate::renderer::Rgb::new(200, 200, 200)
        );
    }

    #[test]
    fn test_run_applies_reloads() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut state = state_with_one_ball().with_reloads(rx);
        tx.send(Population::new(1, Vec::new())).unwrap();

        let mut canvas = FrameBuffer::new(800, 600).with_frame_limit(3);
        let summary = run(&mut state, &mut canvas, &mut FrameClock::unthrottled()).unwrap();
        assert_eq!(summary.reloads, 1);
        assert!(state.population.is_empty());
        assert!(canvas.presented().iter().all(|p| *p == crate::renderer::colors::BACKGROUND));
    }

    #[test]
    fn test_close_flag_from_another_thread_ends_run() {
        let mut state = state_with_one_ball();
        let mut canvas = FrameBuffer::new(800, 600);
        let close = canvas.close_handle();
        let interrupter = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            close.store(true, std::sync::atomic::Ordering::Relaxed);
        });

        let summary = run(&mut state, &mut canvas, &mut FrameClock::new(200)).unwrap();
        interrupter.join().unwrap();
        assert!(summary.frames > 0);
        assert_eq!(summary.frames, state.time_ticks);
    }

    #[test]
    fn test_frame_clock_paces() {
        let mut clock = FrameClock::new(100);
        let start = Instant::now();
        for _ in 0..5 {
            clock.wait();
        }
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
