//! Validate subcommand
//!
//! Merges each location onto the base config and reports validation results.

use super::{log_report, report_passes};
use crate::config::ResolverConfig;
use crate::format::{OutputFormat, format_report_markdown, render_value};
use crate::source::LocationLoader;
use crate::validate::ValidationReport;
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the validate subcommand
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Base (platform-wide) config file
    #[arg(value_name = "BASE")]
    pub base: PathBuf,

    /// Location config files
    #[arg(value_name = "LOCATION", required = true)]
    pub locations: Vec<PathBuf>,

    /// Output format: markdown (default) or json
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    pub format: ReportFormat,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    #[default]
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match OutputFormat::from_str(s) {
            Some(OutputFormat::Json) => Ok(ReportFormat::Json),
            Some(OutputFormat::Markdown) => Ok(ReportFormat::Markdown),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: json, markdown",
                s
            )),
        }
    }
}

/// Validation result for one location file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub report: ValidationReport,
}

/// Run the validate command. Returns false when any location fails.
///
/// A location that cannot be read or parsed is reported as failed; a broken
/// base file is an error.
pub fn run(args: &ValidateArgs, config: &ResolverConfig, out: &mut dyn Write) -> Result<bool> {
    let loader = LocationLoader::new(&args.base, config.merge_options(), config.validator());
    loader.base().context("failed to load base config")?;

    let reports: Vec<FileReport> = args
        .locations
        .iter()
        .map(|path| {
            let report = match loader.load(path) {
                Ok(merged) => merged.validation.clone(),
                Err(e) => ValidationReport::failed(e.to_string()),
            };
            log_report(path, &report);
            FileReport {
                path: path.clone(),
                report,
            }
        })
        .collect();

    match args.format {
        ReportFormat::Json => {
            out.write_all(render_value(&reports, OutputFormat::Json)?.as_bytes())?;
        }
        ReportFormat::Markdown => {
            let md: Vec<String> = reports
                .iter()
                .map(|r| format_report_markdown(&r.path, &r.report))
                .collect();
            writeln!(out, "{}", md.join("\n"))?;
        }
    }

    let warnings_as_errors = config.validation.warnings_as_errors;
    Ok(reports
        .iter()
        .all(|r| report_passes(&r.report, warnings_as_errors)))
}
