//! Live reload of the data file
//!
//! Watches the directory containing the data file (non-recursive) and runs a
//! callback on the notifier's own thread whenever a modification event names
//! the file itself. There is no debouncing: every matching event reloads.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;

use crate::pipeline::PopulationBuilder;
use crate::sim::Population;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("cannot watch '{path}': {reason}")]
    InvalidPath { path: PathBuf, reason: String },
    #[error("file watcher failed: {0}")]
    Notify(#[from] notify::Error),
}

/// Background watcher for a single file
pub struct ReloadWatcher {
    watcher: Option<RecommendedWatcher>,
    target: PathBuf,
    /// Set before the notifier is dropped; its thread is not joined
    stopped: Arc<AtomicBool>,
}

impl ReloadWatcher {
    /// Start watching `path`, calling `on_change` after each modification.
    ///
    /// The parent directory must exist; the file itself may not exist yet.
    pub fn start<F>(path: &Path, mut on_change: F) -> Result<Self, WatchError>
    where
        F: FnMut() + Send + 'static,
    {
        let (dir, target) = resolve_target(path)?;
        let matched = target.clone();
        let stopped = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stopped);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            handle_event(res, &matched, &stop_flag, &mut on_change)
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        log::info!("Watching {} for changes", target.display());
        Ok(Self {
            watcher: Some(watcher),
            target,
            stopped,
        })
    }

    /// Absolute path whose modifications trigger a reload
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Stop watching.
    ///
    /// Events delivered after this returns are ignored. A callback that was
    /// already running when it was called may still finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stopped.store(true, Ordering::Release);
        if let Some(watcher) = self.watcher.take() {
            drop(watcher);
            log::info!("Stopped watching {}", self.target.display());
        }
    }
}

impl Drop for ReloadWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Watch the builder's data file and publish every rebuilt population on `tx`.
///
/// A reload that fails at the file level publishes nothing, so the loop keeps
/// its current population. A file that loads but has no usable rows
/// publishes an empty population.
pub fn watch_population(
    mut builder: PopulationBuilder,
    tx: Sender<Population>,
) -> Result<ReloadWatcher, WatchError> {
    let path = builder.settings().data_path.clone();
    ReloadWatcher::start(&path, move || match builder.build() {
        Ok(population) => {
            log::info!(
                "Reloaded {}: generation {} with {} balls",
                builder.settings().data_path.display(),
                population.generation,
                population.len()
            );
            if tx.send(population).is_err() {
                log::debug!("Simulation gone, dropping reloaded population");
            }
        }
        Err(e) => log::warn!("Reload failed, keeping current balls: {e}"),
    })
}

/// Canonical watch directory and the absolute file path inside it
fn resolve_target(path: &Path) -> Result<(PathBuf, PathBuf), WatchError> {
    let invalid = |reason: String| WatchError::InvalidPath {
        path: path.to_path_buf(),
        reason,
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| invalid("no file name".into()))?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let dir = parent
        .canonicalize()
        .map_err(|e| invalid(format!("directory unavailable: {e}")))?;

    let target = dir.join(file_name);
    Ok((dir, target))
}

fn handle_event<F: FnMut()>(
    res: notify::Result<Event>,
    target: &Path,
    stopped: &AtomicBool,
    on_change: &mut F,
) {
    if stopped.load(Ordering::Acquire) {
        return;
    }
    match res {
        Ok(event) => {
            if is_modification_of(&event, target) {
                log::debug!("Change detected: {:?} on {}", event.kind, target.display());
                on_change();
            }
        }
        Err(e) => log::warn!("File watch error: {e}"),
    }
}

fn is_modification_of(event: &Event, target: &Path) -> bool {
    matches!(event.kind, EventKind::Modify(_)) && event.paths.iter().any(|p| p == target)
}
