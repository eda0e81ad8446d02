//! Configuration loader with tier-based merging.
//!
//! Loads `config.yaml` from each tier and merges them field-by-field with
//! the crate's own merge engine (objects recurse, arrays replace).

use super::types::ResolverConfig;
use crate::merge::{ArrayStrategy, MergeOptions, merge_all};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the config file looked up in each tier directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/location-merge/)
    Project = 1,
    /// User-level config (~/.location-merge/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories for each configuration tier.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: LOCATION_MERGE_USER_DIR or ~/.location-merge
        let user_dir = std::env::var("LOCATION_MERGE_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".location-merge")));

        // Project dir: LOCATION_MERGE_PROJECT_DIR or $CWD/location-merge
        let project_dir = std::env::var("LOCATION_MERGE_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("location-merge")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    /// Config files of each existing tier, lowest priority first.
    pub fn tier_files(&self) -> Vec<(ConfigTier, PathBuf)> {
        [
            (ConfigTier::Project, self.project_dir.as_ref()),
            (ConfigTier::User, self.user_dir.as_ref()),
        ]
        .into_iter()
        .filter_map(|(tier, dir)| {
            let file = dir?.join(CONFIG_FILE_NAME);
            file.exists().then_some((tier, file))
        })
        .collect()
    }
}

/// Loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    config: ResolverConfig,
    /// Config files that contributed, lowest priority first
    sources: Vec<(ConfigTier, PathBuf)>,
    /// Explicit config file replacing the project and user tiers
    explicit: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration with explicit paths.
    ///
    /// `LOCATION_MERGE_CONFIG_PATH` replaces the project and user tiers with
    /// a single explicit file.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let explicit = std::env::var("LOCATION_MERGE_CONFIG_PATH").ok().map(PathBuf::from);
        Self::load_inner(paths, explicit)
    }

    /// Load the defaults plus one explicit config file.
    pub fn load_file(path: &Path) -> Result<Self> {
        Self::load_inner(ConfigPaths::with_dirs(None, None), Some(path.to_path_buf()))
    }

    fn load_inner(paths: ConfigPaths, explicit: Option<PathBuf>) -> Result<Self> {
        let mut layers: Vec<Value> = Vec::new();
        let mut sources = Vec::new();

        // Tier 1: Defaults
        layers.push(serde_json::to_value(ResolverConfig::default())?);

        match explicit.clone() {
            Some(path) => {
                // An explicit file must load; a broken tier file is skipped.
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                let value: Value = serde_yaml::from_str(&content)
                    .with_context(|| format!("invalid config {}", path.display()))?;
                if let Some(layer) = config_layer(value, ConfigTier::Environment, &path) {
                    layers.push(layer);
                    sources.push((ConfigTier::Environment, path));
                }
            }
            None => {
                // Tiers 2 and 3: project, then user
                for (tier, file) in paths.tier_files() {
                    match read_yaml(&file) {
                        Ok(value) => {
                            if let Some(layer) = config_layer(value, tier, &file) {
                                debug!("Loaded {} config: {}", tier, file.display());
                                layers.push(layer);
                                sources.push((tier, file));
                            }
                        }
                        Err(e) => warn!("Skipping {} config {}: {:#}", tier, file.display(), e),
                    }
                }
            }
        }

        let merged = merge_all(&layers, &MergeOptions::replace_arrays());
        let mut config: ResolverConfig = serde_json::from_value(merged)?;

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut config);

        Ok(Self {
            paths,
            config,
            sources,
            explicit,
        })
    }

    /// Load again from the same tiers or explicit file.
    pub fn reload(&self) -> Result<Self> {
        Self::load_inner(self.paths.clone(), self.explicit.clone())
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut ResolverConfig) {
        if let Ok(strategy) = std::env::var("LOCATION_MERGE_ARRAY_STRATEGY") {
            match ArrayStrategy::from_str(&strategy) {
                Some(strategy) => config.merge.array_strategy = strategy,
                None => warn!(
                    "Ignoring LOCATION_MERGE_ARRAY_STRATEGY='{}': expected replace, concat, dedupe or smart",
                    strategy
                ),
            }
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut ResolverConfig {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> ResolverConfig {
        self.config
    }

    /// Config files that contributed, lowest priority first.
    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }

    /// Directories worth watching for config changes.
    pub fn config_dirs(&self) -> Vec<&Path> {
        [self.paths.project_dir.as_deref(), self.paths.user_dir.as_deref()]
            .into_iter()
            .flatten()
            .filter(|dir| dir.exists())
            .collect()
    }
}

/// Turn a parsed config file into a merge layer.
///
/// An empty file parses to null and contributes nothing; any other
/// non-mapping root is skipped with a warning.
fn config_layer(value: Value, tier: ConfigTier, path: &Path) -> Option<Value> {
    match value {
        Value::Object(_) => Some(strip_nulls(value)),
        Value::Null => {
            debug!("Empty {} config: {}", tier, path.display());
            None
        }
        _ => {
            warn!(
                "Skipping {} config {}: expected a mapping at the root",
                tier,
                path.display()
            );
            None
        }
    }
}

/// Drop null entries so an empty YAML section (`watch:`) means "not set".
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}
