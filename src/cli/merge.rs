//! Merge subcommand
//!
//! Prints the merged tree of one base file and one location file.

use super::{log_report, report_passes};
use crate::config::ResolverConfig;
use crate::format::{OutputFormat, render_value};
use crate::source::load_merged_location;
use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the merge subcommand
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Base (platform-wide) config file
    #[arg(value_name = "BASE")]
    pub base: PathBuf,

    /// Location config file
    #[arg(value_name = "LOCATION")]
    pub location: PathBuf,

    /// Output format: json (default) or yaml
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    pub format: TreeOutput,

    /// Write the merged tree to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Validate the merged tree and log the report
    #[arg(long)]
    pub validate: bool,

    /// Exit non-zero when validation fails (implies --validate)
    #[arg(long)]
    pub strict: bool,
}

/// Output format for merged trees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TreeOutput {
    #[default]
    Json,
    Yaml,
}

impl std::str::FromStr for TreeOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(TreeOutput::Json),
            "yaml" | "yml" => Ok(TreeOutput::Yaml),
            _ => Err(format!("Invalid format '{}'. Valid options: json, yaml", s)),
        }
    }
}

impl From<TreeOutput> for OutputFormat {
    fn from(format: TreeOutput) -> Self {
        match format {
            TreeOutput::Json => OutputFormat::Json,
            TreeOutput::Yaml => OutputFormat::Yaml,
        }
    }
}

/// Run the merge command. Returns false when a strict run fails validation.
pub fn run(args: &MergeArgs, config: &ResolverConfig, out: &mut dyn Write) -> Result<bool> {
    let merged = load_merged_location(
        &args.base,
        &args.location,
        &config.merge_options(),
        &config.validator(),
    )
    .context("failed to merge location")?;

    let rendered = render_value(&merged.data, args.format.into())?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote merged config to {}", path.display());
        }
        None => out.write_all(rendered.as_bytes())?,
    }

    if !(args.validate || args.strict) {
        return Ok(true);
    }

    log_report(&merged.path, &merged.validation);
    if args.strict {
        Ok(report_passes(
            &merged.validation,
            config.validation.warnings_as_errors,
        ))
    } else {
        Ok(true)
    }
}
