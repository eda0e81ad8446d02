//! Loading configuration trees from disk.
//!
//! Base and location files are JSON or YAML, picked by extension. The
//! [`LocationLoader`] reads the base config once and caches every merged
//! location until it is invalidated.

use crate::error::{SourceError, SourceResult};
use crate::location::{MergeStatistics, merge_statistics};
use crate::merge::{MergeOptions, merge};
use crate::validate::{LocationValidator, ValidationReport};
use arc_swap::ArcSwapOption;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// On-disk format of a configuration tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormat {
    Json,
    Yaml,
}

impl TreeFormat {
    /// Pick the format from a file extension; unknown extensions are JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => TreeFormat::Yaml,
            _ => TreeFormat::Json,
        }
    }

    /// Whether `path` looks like a configuration tree file.
    pub fn is_tree_file(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json") | Some("yaml") | Some("yml")
        )
    }
}

/// Parse `content` into an object tree.
pub fn parse_tree(content: &str, format: TreeFormat, path: &Path) -> SourceResult<Value> {
    let value: Value = match format {
        TreeFormat::Json => serde_json::from_str(content).map_err(|source| SourceError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        TreeFormat::Yaml => serde_yaml::from_str(content).map_err(|source| SourceError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
    };

    if !value.is_object() {
        return Err(SourceError::NotAnObject {
            path: path.to_path_buf(),
            found: kind_of(&value),
        });
    }
    Ok(value)
}

/// Read and parse a configuration tree file.
pub fn read_tree(path: &Path) -> SourceResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tree(&content, TreeFormat::from_path(path), path)
}

/// List configuration tree files in `dir`, sorted by path.
pub fn list_tree_files(dir: &Path) -> SourceResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| SourceError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && TreeFormat::is_tree_file(path))
        .collect();
    files.sort();
    Ok(files)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A merged and validated location page.
#[derive(Debug, Clone, Serialize)]
pub struct MergedLocation {
    pub path: PathBuf,
    pub data: Value,
    pub validation: ValidationReport,
    pub statistics: MergeStatistics,
}

impl MergedLocation {
    /// Merge, validate and collect statistics for one location tree.
    pub fn build(
        path: PathBuf,
        base: &Value,
        location: &Value,
        options: &MergeOptions,
        validator: &LocationValidator,
    ) -> Self {
        let data = merge(Some(base), Some(location), options);
        let validation = validator.validate(&data);
        let statistics = merge_statistics(base, location, &data);
        Self {
            path,
            data,
            validation,
            statistics,
        }
    }
}

/// Load one base file and one location file, merge and validate.
pub fn load_merged_location(
    base_path: &Path,
    location_path: &Path,
    options: &MergeOptions,
    validator: &LocationValidator,
) -> SourceResult<MergedLocation> {
    let base = read_tree(base_path)?;
    let location = read_tree(location_path)?;
    Ok(MergedLocation::build(
        location_path.to_path_buf(),
        &base,
        &location,
        options,
        validator,
    ))
}

/// Load the base file once and merge every location file onto it.
pub fn load_all_merged_locations(
    base_path: &Path,
    location_paths: &[PathBuf],
    options: &MergeOptions,
    validator: &LocationValidator,
) -> SourceResult<Vec<MergedLocation>> {
    let base = read_tree(base_path)?;
    location_paths
        .iter()
        .map(|path| {
            let location = read_tree(path)?;
            Ok(MergedLocation::build(
                path.clone(),
                &base,
                &location,
                options,
                validator,
            ))
        })
        .collect()
}

/// Caching loader for locations sharing one base config.
///
/// The base tree lives in an `ArcSwapOption` so a reload swaps it in without
/// blocking readers. Merged locations are cached per path, tagged with the
/// base generation they were built from.
pub struct LocationLoader {
    base_path: PathBuf,
    options: MergeOptions,
    validator: LocationValidator,
    base: ArcSwapOption<Value>,
    /// Bumped under the cache write lock on every base reload.
    generation: AtomicU64,
    cache: RwLock<HashMap<PathBuf, Arc<MergedLocation>>>,
}

impl LocationLoader {
    pub fn new(base_path: impl Into<PathBuf>, options: MergeOptions, validator: LocationValidator) -> Self {
        Self {
            base_path: base_path.into(),
            options,
            validator,
            base: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The base tree, read from disk on first use.
    pub fn base(&self) -> SourceResult<Arc<Value>> {
        if let Some(base) = self.base.load_full() {
            return Ok(base);
        }
        let base = Arc::new(read_tree(&self.base_path)?);
        // A concurrent reload may have stored a newer base meanwhile.
        let previous = self
            .base
            .compare_and_swap(&None::<Arc<Value>>, Some(Arc::clone(&base)));
        if let Some(current) = &*previous {
            return Ok(Arc::clone(current));
        }
        debug!("Loaded base config: {}", self.base_path.display());
        Ok(base)
    }

    /// Re-read the base tree and drop every cached location.
    ///
    /// On failure the previous base stays in place.
    pub fn reload_base(&self) -> SourceResult<()> {
        let base = read_tree(&self.base_path)?;
        self.base.store(Some(Arc::new(base)));
        match self.cache.write() {
            Ok(mut cache) => {
                self.generation.fetch_add(1, Ordering::AcqRel);
                cache.clear();
            }
            Err(_) => {
                self.generation.fetch_add(1, Ordering::AcqRel);
                warn!("Location cache lock poisoned during base reload");
            }
        }
        info!("Reloaded base config: {}", self.base_path.display());
        Ok(())
    }

    /// Merged location for `path`, from cache when available.
    pub fn load(&self, path: &Path) -> SourceResult<Arc<MergedLocation>> {
        if let Some(cached) = self.cached(path) {
            return Ok(cached);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let base = self.base()?;
        let location = read_tree(path)?;
        let merged = Arc::new(MergedLocation::build(
            path.to_path_buf(),
            &base,
            &location,
            &self.options,
            &self.validator,
        ));

        match self.cache.write() {
            Ok(mut cache) if self.generation.load(Ordering::Acquire) == generation => {
                cache.insert(path.to_path_buf(), Arc::clone(&merged));
            }
            Ok(_) => debug!("Base reloaded during merge, not caching {}", path.display()),
            Err(_) => warn!("Location cache lock poisoned, not caching {}", path.display()),
        }
        Ok(merged)
    }

    /// Load every tree file in `dir`. Failures are returned per file.
    pub fn load_dir(&self, dir: &Path) -> SourceResult<Vec<(PathBuf, SourceResult<Arc<MergedLocation>>)>> {
        let files = list_tree_files(dir)?;
        let base_path = self
            .base_path
            .canonicalize()
            .unwrap_or_else(|_| self.base_path.clone());
        Ok(files
            .into_iter()
            .filter(|path| match path.canonicalize() {
                Ok(canonical) => canonical != base_path,
                Err(_) => path != &base_path,
            })
            .map(|path| {
                let result = self.load(&path);
                (path, result)
            })
            .collect())
    }

    /// Drop the cached entry for `path`.
    pub fn invalidate(&self, path: &Path) -> bool {
        match self.cache.write() {
            Ok(mut cache) => cache.remove(path).is_some(),
            Err(_) => false,
        }
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    pub fn cached_count(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    fn cached(&self, path: &Path) -> Option<Arc<MergedLocation>> {
        self.cache.read().ok()?.get(path).cloned()
    }
}
