//! exposure-cube - Command Line Operations for Exposure Simulation
//!
//! Operational entry point for the exposure cube engine.
//!
//! # Commands
//!
//! - `exposure-cube run --config <file>` - Simulate, aggregate and export
//! - `exposure-cube check --config <file>` - Validate a configuration
//! - `exposure-cube sample-config` - Print an example configuration
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate turns a TOML run
//! configuration into engine inputs and drives `pricer_exposure`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod setup;

/// Exposure cube simulation CLI
#[derive(Parser)]
#[command(name = "exposure-cube")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "exposure.toml")]
    config: PathBuf,

    /// Override the number of Monte Carlo samples
    #[arg(short, long, global = true)]
    samples: Option<usize>,

    /// Override the output directory
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the portfolio and write cubes, exposures, DIM and a summary
    Run,

    /// Validate the configuration and build the engine inputs
    Check,

    /// Print an example configuration
    SampleConfig {
        /// Write to this file instead of stdout
        #[arg(long)]
        to: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let overrides = commands::Overrides {
        samples: cli.samples,
        output_dir: cli.output_dir,
    };

    match cli.command {
        Commands::Run => {
            let summary = commands::run::run(&cli.config, &overrides)
                .with_context(|| format!("run failed for {}", cli.config.display()))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Check => commands::check::run(&cli.config, &overrides)
            .with_context(|| format!("invalid configuration {}", cli.config.display()))?,
        Commands::SampleConfig { to } => commands::sample_config::run(to.as_deref())?,
    }
    Ok(())
}
