//! Watch subcommand
//!
//! Merges every location in a directory, then re-merges whatever a file
//! change touches: one location, every location after a base change, or a
//! fresh loader after a config change.

use super::{log_report, report_passes};
use crate::config::watcher::{ChangeEvent, WatchPaths, WatcherConfig, start_watcher};
use crate::config::{ConfigLoader, ResolverConfig};
use crate::error::SourceResult;
use crate::source::{LocationLoader, MergedLocation};
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Arguments for the watch subcommand
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Base (platform-wide) config file
    #[arg(value_name = "BASE")]
    pub base: PathBuf,

    /// Directory of location config files
    #[arg(value_name = "LOCATION_DIR")]
    pub location_dir: PathBuf,
}

/// Watch session state.
struct WatchState {
    config_loader: ConfigLoader,
    loader: LocationLoader,
    base: PathBuf,
    location_dir: PathBuf,
}

impl WatchState {
    fn new(config_loader: ConfigLoader, base: PathBuf, location_dir: PathBuf) -> Self {
        let loader = build_loader(&base, config_loader.config());
        Self {
            config_loader,
            loader,
            base,
            location_dir,
        }
    }

    fn config(&self) -> &ResolverConfig {
        self.config_loader.config()
    }

    /// Merge and report every location in the directory.
    fn report_all(&self) {
        match self.loader.load_dir(&self.location_dir) {
            Ok(results) => {
                let total = results.len();
                let mut passed = 0;
                for (path, result) in results {
                    if self.report_result(&path, result) {
                        passed += 1;
                    }
                }
                println!("{} of {} locations pass", passed, total);
            }
            Err(e) => warn!("Failed to list {}: {}", self.location_dir.display(), e),
        }
    }

    fn report_result(
        &self,
        path: &Path,
        result: SourceResult<Arc<MergedLocation>>,
    ) -> bool {
        match result {
            Ok(merged) => {
                log_report(path, &merged.validation);
                let ok = report_passes(&merged.validation, self.config().validation.warnings_as_errors);
                println!("{} {}", if ok { "ok  " } else { "FAIL" }, path.display());
                ok
            }
            Err(e) => {
                warn!("{}", e);
                println!("FAIL {}", path.display());
                false
            }
        }
    }

    /// React to one change event.
    fn on_change(&mut self, event: &ChangeEvent) {
        let mut base_changed = false;
        let mut config_changed = false;
        let mut locations = Vec::new();

        for path in event.affected_paths() {
            if path == self.base {
                base_changed = true;
            } else if path.parent() == Some(self.location_dir.as_path()) {
                locations.push(path.to_path_buf());
            } else {
                config_changed = true;
            }
        }

        if config_changed {
            match self.config_loader.reload() {
                Ok(reloaded) => {
                    info!("Reloaded tool config");
                    self.config_loader = reloaded;
                    self.loader = build_loader(&self.base, self.config_loader.config());
                }
                Err(e) => warn!("Keeping previous config: {:#}", e),
            }
            self.report_all();
        } else if base_changed {
            if let Err(e) = self.loader.reload_base() {
                warn!("Keeping previous base config: {}", e);
            }
            self.report_all();
        } else {
            for path in locations {
                self.loader.invalidate(&path);
                if path.exists() {
                    let result = self.loader.load(&path);
                    self.report_result(&path, result);
                } else {
                    info!("Location removed: {}", path.display());
                }
            }
        }
    }
}

fn build_loader(base: &Path, config: &ResolverConfig) -> LocationLoader {
    LocationLoader::new(base, config.merge_options(), config.validator())
}

/// Run the watch command until interrupted.
pub async fn run(args: WatchArgs, config_loader: ConfigLoader) -> Result<()> {
    // Watcher events carry absolute paths
    let base = args
        .base
        .canonicalize()
        .with_context(|| format!("base config not found: {}", args.base.display()))?;
    let location_dir = args
        .location_dir
        .canonicalize()
        .with_context(|| format!("location directory not found: {}", args.location_dir.display()))?;
    let config_dirs: Vec<PathBuf> = config_loader
        .config_dirs()
        .into_iter()
        .filter_map(|dir| dir.canonicalize().ok())
        .collect();
    let debounce = config_loader.config().watch.debounce();

    let mut state = WatchState::new(config_loader, base.clone(), location_dir.clone());
    state.loader.base().context("failed to load base config")?;
    state.report_all();

    let watch_paths = WatchPaths {
        base_file: base,
        location_dir,
        config_dirs,
    };
    let watcher_config = WatcherConfig {
        debounce_duration: debounce,
    };
    let mut handle = start_watcher(watch_paths, watcher_config).context("failed to start file watcher")?;
    info!("Watching for changes (Ctrl+C to stop)");

    loop {
        tokio::select! {
            event = handle.wait_for_change() => match event {
                Some(event) if event.requires_reload() => {
                    info!("Change detected: {:?}", event);
                    state.on_change(&event);
                }
                Some(ChangeEvent::Error(e)) => warn!("Watcher error: {}", e),
                Some(_) => {}
                None => {
                    // Sender dropped -- watcher stopped
                    info!("File watcher stopped");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
        }
    }

    Ok(())
}
