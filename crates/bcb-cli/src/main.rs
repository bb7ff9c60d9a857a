// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
mod commands;

use anyhow::{Context, Result};
use bcb_baichuan_sdk::request::current_timestamp;
use bcb_config::{ENV_LOG_LEVEL, load_config, validate_config};
use clap::{Parser, Subcommand};
use commands::Direction;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bcb", version, about = "Baichuan bridge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the X-BC-Signature of a JSON payload.
    Sign {
        /// Payload file, or `-` for stdin.
        #[arg(long)]
        payload: String,

        /// Unix timestamp in seconds (defaults to now).
        #[arg(long, allow_negative_numbers = true)]
        timestamp: Option<i64>,
    },

    /// Build a signed chat request from a JSON array of messages.
    Request {
        /// Messages file, or `-` for stdin.
        #[arg(long)]
        messages: String,

        /// Target the streaming endpoint.
        #[arg(long)]
        stream: bool,

        /// Unix timestamp in seconds (defaults to now).
        #[arg(long, allow_negative_numbers = true)]
        timestamp: Option<i64>,
    },

    /// Convert a JSON array of messages between typed and wire shapes.
    Convert {
        #[arg(long, value_enum)]
        direction: Direction,

        /// Input file, or `-` for stdin.
        #[arg(long)]
        input: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config loading logs through a scoped subscriber; the loaded config then
    // picks the level for the rest of the run.
    let bootstrap_level = std::env::var(ENV_LOG_LEVEL).ok();
    let config = tracing::subscriber::with_default(
        build_subscriber(log_filter(bootstrap_level.as_deref(), cli.debug)),
        || load_config(cli.config.as_deref()),
    )
    .context("load config")?;
    tracing::subscriber::set_global_default(build_subscriber(log_filter(
        config.log_level.as_deref(),
        cli.debug,
    )))
    .context("install tracing subscriber")?;
    for warning in validate_config(&config).context("validate config")? {
        warn!(target: "bcb_cli", "{warning}");
    }

    let output = match cli.command {
        Commands::Sign { payload, timestamp } => {
            let ts = timestamp.unwrap_or_else(current_timestamp);
            debug!(target: "bcb_cli", ts, "signing payload");
            commands::sign(&config.baichuan, &commands::read_input(&payload)?, ts)?
        }
        Commands::Request {
            messages,
            stream,
            timestamp,
        } => {
            let mut baichuan = config.baichuan.clone();
            baichuan.streaming |= stream;
            let ts = timestamp.unwrap_or_else(current_timestamp);
            commands::request(&baichuan, &commands::read_input(&messages)?, ts)?
        }
        Commands::Convert { direction, input } => {
            commands::convert(direction, &commands::read_input(&input)?)?
        }
    };
    println!("{output}");
    Ok(())
}

fn log_filter(level: Option<&str>, debug: bool) -> EnvFilter {
    let level = if debug { "debug" } else { level.unwrap_or("info") };
    EnvFilter::new(format!(
        "bcb_cli={level},bcb_baichuan_sdk={level},bcb_config={level}"
    ))
}

fn build_subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}
