//! # pitlane
//!
//! CLI tool for replaying captured simulator sessions through the Pitlane
//! session state engine.
//!
//! ## Commands
//!
//! - `replay`: Feed a capture file through the engine and print what it does
//! - `config`: Show the effective client configuration
//!
//! ## Example
//!
//! ```bash
//! # Replay a capture, one JSON line per notification or request
//! pitlane replay session.jsonl
//!
//! # Only print the end-of-replay summary, with debug logging on stderr
//! RUST_LOG=debug pitlane replay session.jsonl --quiet
//!
//! # Show the configuration a replay would use
//! pitlane config --config pitlane.toml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use pitlane_state_client::ClientConfig;

mod commands;

use commands::{config, replay};

/// Replay captured simulator sessions through the Pitlane state engine.
#[derive(Parser, Debug)]
#[command(name = "pitlane")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Client configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a capture file (one host message per JSON line)
    Replay {
        /// Capture file to replay
        capture: PathBuf,

        /// Only print the summary
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the replay output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client_config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay { capture, quiet } => {
            replay::run(&capture, client_config, quiet).await?;
        }
        Commands::Config => {
            config::run(&client_config)?;
        }
    }

    Ok(())
}

/// Load the client configuration, or the defaults when no file is given.
fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(ClientConfig::default()),
    }
}
