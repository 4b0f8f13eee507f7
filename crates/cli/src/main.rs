//! SkyNotify CLI
//!
//! A command-line tool for checking a running monitor, replaying recorded
//! readings through the analyzer, and inspecting thresholds.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{replay, status, thresholds};
use std::path::PathBuf;

/// SkyNotify CLI
#[derive(Parser)]
#[command(name = "skyctl")]
#[command(author, version, about = "CLI for the SkyNotify resource monitor", long_about = None)]
pub struct Cli {
    /// Monitor API URL (can also be set via SKYCTL_API_URL env var)
    #[arg(long, env = "SKYCTL_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the latest analysis and recent alerts of a running monitor
    Status,

    /// Replay recorded readings (NDJSON) through the analyzer
    Replay {
        /// File with one {"resource", "value", "timestamp"} object per line
        file: PathBuf,

        /// Monitor configuration file (uses defaults if not specified)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Show effective thresholds and alert gating settings
    Thresholds {
        /// Monitor configuration file (uses defaults if not specified)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let client = client::ApiClient::new(&cli.api_url)?;
            status::show_status(&client, cli.format).await?;
        }
        Commands::Replay { file, config } => {
            replay::run_replay(&file, config.as_deref(), cli.format)?;
        }
        Commands::Thresholds { config } => {
            thresholds::show_thresholds(config.as_deref(), cli.format)?;
        }
    }

    Ok(())
}
