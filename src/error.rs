//! Error types for loading configuration trees.
//!
//! Merging and validation never fail; only reading and parsing files does.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a file into a configuration tree.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} must contain an object at the root, found {found}", .path.display())]
    NotAnObject { path: PathBuf, found: &'static str },
}

impl SourceError {
    /// The file the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            SourceError::Read { path, .. }
            | SourceError::Json { path, .. }
            | SourceError::Yaml { path, .. }
            | SourceError::NotAnObject { path, .. } => path,
        }
    }
}

/// Result type for loading operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
