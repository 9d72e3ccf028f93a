//! Data Balls entry point
//!
//! Loads the data file, starts the live-reload watcher and runs the loop in a
//! window (or headless on a software frame buffer) until closed.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;

use data_balls::app::{self, FrameClock, RunSummary};
use data_balls::pipeline::PopulationBuilder;
use data_balls::renderer::{FrameBuffer, WindowCanvas};
use data_balls::settings::Settings;
use data_balls::sim::{Bounds, SimulationState};
use data_balls::watcher::watch_population;

#[derive(Debug, Parser)]
#[command(name = "data-balls", version, about = "Balls sized and sped by a live CSV file")]
struct Cli {
    /// CSV file with `Date` and `Amount` columns
    data_path: Option<PathBuf>,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Target ticks per second
    #[arg(long)]
    fps: Option<u32>,

    /// RNG seed for reproducible layouts
    #[arg(long)]
    seed: Option<u64>,

    /// Render off-screen instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Stop after this many frames (implies --headless)
    #[arg(long)]
    frames: Option<u64>,

    /// Write the last frame to this PNG on exit (implies --headless)
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(path) = &self.data_path {
            settings.data_path = path.clone();
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(fps) = self.fps {
            settings.fps = fps;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn headless(&self) -> bool {
        self.headless || self.frames.is_some() || self.snapshot.is_some()
    }
}

/// Route Ctrl-C to the canvas close flag so shutdown runs normally
fn close_on_interrupt(close: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || close.store(true, Ordering::Relaxed)) {
        log::warn!("Ctrl-C handler not installed: {e}");
    }
}

fn run_headless(cli: &Cli, settings: &Settings, state: &mut SimulationState) -> Result<RunSummary> {
    let mut canvas = FrameBuffer::new(settings.width, settings.height);
    if let Some(frames) = cli.frames {
        canvas = canvas.with_frame_limit(frames);
    }
    close_on_interrupt(canvas.close_handle());

    let summary = app::run(state, &mut canvas, &mut FrameClock::new(settings.fps))
        .context("rendering failed")?;
    if let Some(path) = &cli.snapshot {
        canvas.save_png(path).context("snapshot failed")?;
    }
    Ok(summary)
}

fn run_windowed(settings: &Settings, state: &mut SimulationState) -> Result<RunSummary> {
    let mut canvas = WindowCanvas::open("Data Balls", settings.width, settings.height)
        .context("no display available; run with --headless")?;
    close_on_interrupt(canvas.close_handle());

    let summary = app::run(state, &mut canvas, &mut FrameClock::new(settings.fps))
        .context("rendering failed")?;
    Ok(summary)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = cli.settings().context("invalid configuration")?;
    log::info!(
        "Data Balls starting: {} at {}x{} @ {} fps",
        settings.data_path.display(),
        settings.width,
        settings.height,
        settings.fps
    );

    let mut builder = PopulationBuilder::new(settings.clone());
    let population = builder.build_or_empty();

    let (reload_tx, reload_rx) = crossbeam_channel::unbounded();
    let watcher = match watch_population(builder, reload_tx) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            log::warn!("Live reload disabled: {e}");
            None
        }
    };

    let bounds = Bounds::new(settings.width as f32, settings.height as f32);
    let mut state = SimulationState::new(bounds, population).with_reloads(reload_rx);

    let result = if cli.headless() {
        run_headless(&cli, &settings, &mut state)
    } else {
        run_windowed(&settings, &mut state)
    };

    if let Some(watcher) = watcher {
        watcher.stop();
    }
    let summary = result?;

    log::info!(
        "Done: {} frames, {} reloads, {} collisions",
        summary.frames,
        summary.reloads,
        summary.collisions
    );
    Ok(())
}
