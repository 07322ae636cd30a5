//! CLI for the streamdir directory aggregator.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use streamdir_core::config;

use commands::{run_pipeline, run_probe, run_sources, run_status};

/// Top-level CLI for the streamdir directory aggregator.
#[derive(Debug, Parser)]
#[command(name = "streamdir")]
#[command(about = "streamdir: aggregate, validate, and export live-stream directories", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the full aggregation pipeline and write the export artifacts.
    Run,

    /// Probe a single URL's liveness (debug aid).
    Probe {
        /// URL to probe.
        url: String,
    },

    /// List configured sources.
    Sources,

    /// Show the history file location and known-URL count.
    Status,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run => run_pipeline(&cfg).await?,
            CliCommand::Probe { url } => run_probe(&cfg, &url).await?,
            CliCommand::Sources => run_sources(&cfg)?,
            CliCommand::Status => run_status(&cfg)?,
        }

        Ok(())
    }
}
