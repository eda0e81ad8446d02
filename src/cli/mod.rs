//! CLI command definitions for location-merge
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod merge;
pub mod stats;
pub mod validate;
pub mod watch;

use crate::validate::ValidationReport;
use clap::{Parser, Subcommand};
use merge::MergeArgs;
use stats::StatsArgs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use validate::ValidateArgs;
use watch::WatchArgs;

/// Merge platform site config with per-location page config
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (replaces project and user config)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge a location file onto the base config and print the result
    Merge(MergeArgs),

    /// Merge and validate one or more location files
    Validate(ValidateArgs),

    /// Show where the fields of a merged location came from
    Stats(StatsArgs),

    /// Re-merge and re-validate locations whenever files change
    Watch(WatchArgs),
}

/// Whether a report passes, optionally counting warnings as failures.
pub fn report_passes(report: &ValidationReport, warnings_as_errors: bool) -> bool {
    report.is_valid() && (!warnings_as_errors || report.warnings().is_empty())
}

/// Log every error and warning of a report.
pub fn log_report(path: &Path, report: &ValidationReport) {
    for error in report.errors() {
        warn!("{}: {}", path.display(), error);
    }
    for warning in report.warnings() {
        info!("{}: {}", path.display(), warning);
    }
    if report.is_valid() {
        info!(
            "{}: valid ({} warnings)",
            path.display(),
            report.warnings().len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_merge_command() {
        let cli = Cli::parse_from([
            "location-merge",
            "merge",
            "site.json",
            "az.yaml",
            "--format",
            "yaml",
            "--strict",
            "--log",
            "off",
        ]);
        assert_eq!(cli.log, "off");
        match cli.command {
            Command::Merge(args) => {
                assert_eq!(args.base, PathBuf::from("site.json"));
                assert_eq!(args.location, PathBuf::from("az.yaml"));
                assert_eq!(args.format, merge::TreeOutput::Yaml);
                assert!(args.strict);
                assert!(!args.validate);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_validate_many() {
        let cli = Cli::parse_from(["location-merge", "validate", "site.json", "a.json", "b.json"]);
        match cli.command {
            Command::Validate(args) => assert_eq!(args.locations.len(), 2),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_report_passes() {
        let clean = ValidationReport::new(vec![], vec![]);
        let warned = ValidationReport::new(vec![], vec!["No images provided".to_string()]);
        let failed = ValidationReport::failed("Missing required field: slug");

        assert!(report_passes(&clean, true));
        assert!(report_passes(&warned, false));
        assert!(!report_passes(&warned, true));
        assert!(!report_passes(&failed, false));
    }
}
