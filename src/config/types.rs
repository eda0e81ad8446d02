//! Configuration types for the resolver tool.

use crate::merge::{ArrayStrategy, DEFAULT_IDENTITY_KEYS, MergeOptions};
use crate::validate::{DEFAULT_RECOMMENDED_FIELDS, DEFAULT_REQUIRED_FIELDS, LocationValidator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl ResolverConfig {
    pub fn merge_options(&self) -> MergeOptions {
        self.merge.to_options()
    }

    pub fn validator(&self) -> LocationValidator {
        self.validation.to_validator()
    }
}

/// Merge behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Array strategy for keys without an explicit strategy (default: smart).
    #[serde(default)]
    pub array_strategy: ArrayStrategy,

    /// Start from the location preset (default: true). When false, only the
    /// keys listed here are classified.
    #[serde(default = "default_true")]
    pub location_preset: bool,

    /// Extra keys always replaced.
    #[serde(default)]
    pub replace_keys: Vec<String>,

    /// Extra keys concatenated.
    #[serde(default)]
    pub concat_keys: Vec<String>,

    /// Extra keys de-duplicated.
    #[serde(default)]
    pub dedupe_keys: Vec<String>,

    /// Keys removed from every preset strategy set.
    #[serde(default)]
    pub unset_keys: Vec<String>,

    /// Root fields pinned to the location's value.
    #[serde(default = "default_identity_keys")]
    pub identity_keys: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            array_strategy: ArrayStrategy::default(),
            location_preset: true,
            replace_keys: Vec::new(),
            concat_keys: Vec::new(),
            dedupe_keys: Vec::new(),
            unset_keys: Vec::new(),
            identity_keys: default_identity_keys(),
        }
    }
}

impl MergeConfig {
    pub fn to_options(&self) -> MergeOptions {
        let mut options = if self.location_preset {
            MergeOptions::location_defaults()
        } else {
            MergeOptions::new()
        };
        for key in &self.unset_keys {
            options = options.without_key(key);
        }
        options
            .with_array_strategy(self.array_strategy)
            .with_replace_keys(self.replace_keys.iter().cloned())
            .with_concat_keys(self.concat_keys.iter().cloned())
            .with_dedupe_keys(self.dedupe_keys.iter().cloned())
            .with_identity_keys(self.identity_keys.iter().cloned())
    }
}

/// Validation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,

    #[serde(default = "default_recommended_fields")]
    pub recommended_fields: Vec<String>,

    /// Pattern and range checks on location fields (default: true).
    #[serde(default = "default_true")]
    pub check_formats: bool,

    /// Duplicate image and FAQ warnings (default: true).
    #[serde(default = "default_true")]
    pub check_duplicates: bool,

    /// Treat warnings as errors in `merge --strict` and `validate` (default: false).
    #[serde(default)]
    pub warnings_as_errors: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_fields: default_required_fields(),
            recommended_fields: default_recommended_fields(),
            check_formats: true,
            check_duplicates: true,
            warnings_as_errors: false,
        }
    }
}

impl ValidationConfig {
    pub fn to_validator(&self) -> LocationValidator {
        LocationValidator {
            required_fields: self.required_fields.clone(),
            recommended_fields: self.recommended_fields.clone(),
            check_formats: self.check_formats,
            check_duplicates: self.check_duplicates,
        }
    }
}

/// File watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce window in milliseconds (default: 500).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_identity_keys() -> Vec<String> {
    DEFAULT_IDENTITY_KEYS.iter().map(|k| k.to_string()).collect()
}

fn default_required_fields() -> Vec<String> {
    DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect()
}

fn default_recommended_fields() -> Vec<String> {
    DEFAULT_RECOMMENDED_FIELDS.iter().map(|f| f.to_string()).collect()
}

fn default_debounce_ms() -> u64 {
    500
}
