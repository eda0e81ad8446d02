//! location-merge command-line tool
//!
//! Merges base and location config files, validates the result and watches
//! for changes.

use anyhow::Result;
use clap::Parser;
use location_merge::cli::{Cli, Command, merge, stats, validate, watch};
use location_merge::config::ConfigLoader;
use location_merge::logging::{LogTarget, init_logging};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    let loader = match &cli.config {
        Some(path) => ConfigLoader::load_file(path)?,
        None => ConfigLoader::load()?,
    };
    for (tier, path) in loader.sources() {
        debug!("Using {} config: {}", tier, path.display());
    }

    let mut out = std::io::stdout();
    let ok = match cli.command {
        Command::Merge(args) => merge::run(&args, loader.config(), &mut out)?,
        Command::Validate(args) => validate::run(&args, loader.config(), &mut out)?,
        Command::Stats(args) => {
            stats::run(&args, loader.config(), &mut out)?;
            true
        }
        Command::Watch(args) => {
            watch::run(args, loader).await?;
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
