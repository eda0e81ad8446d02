//! Stats subcommand
//!
//! Shows which top-level fields of a merged location came from the base
//! config, from the location, or from both.

use super::validate::ReportFormat;
use crate::config::ResolverConfig;
use crate::format::{OutputFormat, format_statistics_markdown, render_value};
use crate::source::load_merged_location;
use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the stats subcommand
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Base (platform-wide) config file
    #[arg(value_name = "BASE")]
    pub base: PathBuf,

    /// Location config file
    #[arg(value_name = "LOCATION")]
    pub location: PathBuf,

    /// Output format: markdown (default) or json
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    pub format: ReportFormat,
}

/// Run the stats command.
pub fn run(args: &StatsArgs, config: &ResolverConfig, out: &mut dyn Write) -> Result<()> {
    let merged = load_merged_location(
        &args.base,
        &args.location,
        &config.merge_options(),
        &config.validator(),
    )
    .context("failed to merge location")?;

    match args.format {
        ReportFormat::Json => {
            out.write_all(render_value(&merged.statistics, OutputFormat::Json)?.as_bytes())?;
        }
        ReportFormat::Markdown => {
            out.write_all(format_statistics_markdown(&merged.path, &merged.statistics).as_bytes())?;
        }
    }
    Ok(())
}
