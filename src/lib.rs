//! Location merge library
//!
//! Deep-merges a platform-wide site configuration with per-location page
//! configuration and validates the result.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod location;
pub mod logging;
pub mod merge;
pub mod source;
pub mod validate;

pub use location::{MergeStatistics, merge_location, merge_statistics};
pub use merge::{MergeOptions, classify, dedupe, item_key, merge, merge_all};
pub use validate::{ValidationReport, validate, validate_location};
