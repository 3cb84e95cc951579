//! sector-hound - Offline forensic triage of raw disk images
//!
//! Partition tables, hidden-sector scans, header carving and extension
//! spoofing checks over read-only evidence.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sector_hound::cli::{self, Cli};
use sector_hound::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    init_logging(&cli, &config)?;

    if let Err(e) = cli::run::execute(cli.command, &config, &config_path).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let level = if cli.verbose {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    let filter = EnvFilter::from_default_env().add_directive(format!("sector_hound={}", level).parse()?);

    if cli.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    Ok(())
}
