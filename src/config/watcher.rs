//! File watcher for base, location and tool config files.
//!
//! Watches for changes to:
//! - the base config file (by watching its parent directory)
//! - the location directory
//! - config tier directories (`config.yaml`)
//!
//! Emits events through a tokio watch channel. Uses debouncing to coalesce
//! rapid file changes.

use crate::source::TreeFormat;
use notify_debouncer_mini::{DebouncedEventKind, new_debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Event types emitted when watched files change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The base config file changed
    BaseChanged(PathBuf),
    /// A location file was added, modified or removed
    LocationChanged(PathBuf),
    /// A tool config file changed
    ConfigChanged(PathBuf),
    /// Multiple files changed in quick succession
    BatchChange(Vec<PathBuf>),
    /// Watcher encountered an error
    Error(String),
}

impl ChangeEvent {
    /// Returns true if this event requires re-merging.
    pub fn requires_reload(&self) -> bool {
        !matches!(self, ChangeEvent::Error(_))
    }

    /// Get the affected paths for this event.
    pub fn affected_paths(&self) -> Vec<&Path> {
        match self {
            ChangeEvent::BaseChanged(p)
            | ChangeEvent::LocationChanged(p)
            | ChangeEvent::ConfigChanged(p) => vec![p.as_path()],
            ChangeEvent::BatchChange(paths) => paths.iter().map(|p| p.as_path()).collect(),
            ChangeEvent::Error(_) => vec![],
        }
    }
}

/// Configuration for the file watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Debounce duration for coalescing rapid changes.
    pub debounce_duration: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(500),
        }
    }
}

/// Paths to watch.
#[derive(Debug, Clone)]
pub struct WatchPaths {
    /// Base config file
    pub base_file: PathBuf,
    /// Directory holding location files
    pub location_dir: PathBuf,
    /// Config tier directories
    pub config_dirs: Vec<PathBuf>,
}

/// Handle to control the watcher.
pub struct WatcherHandle {
    /// Receiver for change events.
    pub events: watch::Receiver<Option<ChangeEvent>>,
    /// Handle to the watcher task (dropping this will stop the watcher).
    _task_handle: tokio::task::JoinHandle<()>,
}

impl WatcherHandle {
    /// Wait for the next change event.
    pub async fn wait_for_change(&mut self) -> Option<ChangeEvent> {
        // Skip the initial None value
        loop {
            if self.events.changed().await.is_err() {
                return None; // Sender dropped
            }
            let event = self.events.borrow().clone();
            if event.is_some() {
                return event;
            }
        }
    }

    /// Get the latest event without waiting.
    pub fn latest_event(&self) -> Option<ChangeEvent> {
        self.events.borrow().clone()
    }
}

/// Starts the file watcher. Must be called from within a tokio runtime.
pub fn start_watcher(paths: WatchPaths, config: WatcherConfig) -> Result<WatcherHandle, notify::Error> {
    let (event_tx, event_rx) = watch::channel(None);
    let (notify_tx, notify_rx) = mpsc::channel();

    let mut debouncer = new_debouncer(config.debounce_duration, notify_tx)?;
    let watcher = debouncer.watcher();

    let base_dir = paths
        .base_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut dirs = vec![base_dir];
    if !dirs.contains(&paths.location_dir) {
        dirs.push(paths.location_dir.clone());
    }
    for dir in &paths.config_dirs {
        if !dirs.contains(dir) {
            dirs.push(dir.clone());
        }
    }

    for dir in &dirs {
        if dir.exists() {
            info!("Watching directory: {}", dir.display());
            watcher.watch(dir, notify::RecursiveMode::NonRecursive)?;
        } else {
            warn!("Directory does not exist, skipping watch: {}", dir.display());
        }
    }

    let task_handle = tokio::task::spawn_blocking(move || {
        // Keep the debouncer alive
        let _debouncer = debouncer;
        process_notify_events(notify_rx, event_tx, &paths);
    });

    Ok(WatcherHandle {
        events: event_rx,
        _task_handle: task_handle,
    })
}

/// Convert debounced notify events into change events.
fn process_notify_events(
    rx: mpsc::Receiver<Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>>,
    tx: watch::Sender<Option<ChangeEvent>>,
    paths: &WatchPaths,
) {
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<PathBuf> = events
                    .into_iter()
                    .filter(|e| {
                        matches!(
                            e.kind,
                            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                        )
                    })
                    .map(|e| e.path)
                    .collect();

                if let Some(event) = classify_events(changed, paths) {
                    debug!("Change detected: {:?}", event);
                    if tx.send(Some(event)).is_err() {
                        info!("Watcher receiver dropped, stopping");
                        return;
                    }
                }
            }
            Ok(Err(e)) => {
                error!("File watcher error: {}", e);
                let _ = tx.send(Some(ChangeEvent::Error(e.to_string())));
            }
            Err(_) => {
                info!("Watcher channel closed, stopping");
                return;
            }
        }
    }
}

/// Fold a batch of changed paths into one event.
fn classify_events(changed: Vec<PathBuf>, paths: &WatchPaths) -> Option<ChangeEvent> {
    let mut relevant: Vec<PathBuf> = Vec::new();
    for path in changed {
        if classify_path(&path, paths).is_some() && !relevant.contains(&path) {
            relevant.push(path);
        }
    }

    match relevant.len() {
        0 => None,
        1 => relevant.pop().and_then(|p| classify_path(&p, paths)),
        _ => Some(ChangeEvent::BatchChange(relevant)),
    }
}

/// Classify a single path.
fn classify_path(path: &Path, paths: &WatchPaths) -> Option<ChangeEvent> {
    if same_file(path, &paths.base_file) {
        return Some(ChangeEvent::BaseChanged(path.to_path_buf()));
    }

    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if file_name == super::loader::CONFIG_FILE_NAME
        && paths.config_dirs.iter().any(|d| path.starts_with(d))
    {
        return Some(ChangeEvent::ConfigChanged(path.to_path_buf()));
    }

    if path.parent().is_some_and(|p| same_file(p, &paths.location_dir))
        && TreeFormat::is_tree_file(path)
    {
        return Some(ChangeEvent::LocationChanged(path.to_path_buf()));
    }

    None
}

/// Path equality that tolerates one side being relative.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.ends_with(b) || b.ends_with(a),
    }
}
