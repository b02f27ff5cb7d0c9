//! CLI for the cmux request scheduler.

mod commands;
mod manifest;
mod report;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use cmux_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_get, run_manifest};

/// Top-level CLI for cmux.
#[derive(Debug, Parser)]
#[command(name = "cmux")]
#[command(about = "cmux: priority-weighted concurrent HTTP fetcher", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/cmux/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Options shared by the fetching subcommands.
#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Maximum requests in flight (overrides `thread_limit` from config).
    #[arg(
        long,
        short = 'j',
        value_name = "N",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub threads: Option<usize>,

    /// Directory receiving `<channel>/<job>` files.
    #[arg(long, short = 'o', default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Print the report as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch URLs through a single channel.
    Get {
        /// HTTP/HTTPS URLs to fetch.
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,

        /// Channel name (also the output subdirectory).
        #[arg(long, default_value = "get")]
        name: String,

        /// Channel priority (only relevant next to other channels).
        #[arg(long, default_value_t = 1.0)]
        priority: f64,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Fetch every channel listed in a TOML manifest.
    Run {
        /// Manifest with `[[channel]]` tables (name, priority, urls, headers).
        manifest: PathBuf,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Compute SHA-256 of a file (e.g. after download).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                urls,
                name,
                priority,
                fetch,
            } => run_get(&cfg, name, priority, urls, &fetch).await?,
            CliCommand::Run { manifest, fetch } => run_manifest(&cfg, &manifest, &fetch).await?,
            CliCommand::Checksum { path } => run_checksum(&path).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
