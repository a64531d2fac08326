//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;

/// TempNet - simulated temperature-control worker network
#[derive(Debug, Parser)]
#[command(
    name = "tn",
    about = "Simulated temperature-control network of workers and a coordinator",
    version = env!("CARGO_PKG_VERSION"),
    after_help = after_help()
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the network until interrupted or the duration elapses
    Run(RunArgs),

    /// Print the effective configuration as YAML
    Config,
}

/// Options for `tn run`, each overriding the config file
#[derive(Debug, Default, Clone, clap::Args)]
pub struct RunArgs {
    /// Number of workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Stop after this many seconds
    #[arg(short, long, value_name = "SECS")]
    pub duration: Option<u64>,

    /// Do not print the status table
    #[arg(long)]
    pub no_display: bool,

    /// Record samples to this JSONL file
    #[arg(short, long, value_name = "PATH", conflicts_with = "no_store")]
    pub store: Option<PathBuf>,

    /// Do not record samples
    #[arg(long)]
    pub no_store: bool,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RunArgs {
    /// Fold command-line overrides into the loaded config
    pub fn apply_to(&self, config: &mut Config) {
        debug!(args = ?self, "RunArgs::apply_to: called");
        if let Some(workers) = self.workers {
            config.network.number_of_workers = workers;
        }
        if let Some(seed) = self.seed {
            config.network.seed = Some(seed);
        }
        if self.no_display {
            config.display.enabled = false;
        }
        if let Some(path) = &self.store {
            config.store.enabled = true;
            config.store.path = Some(path.clone());
        }
        if self.no_store {
            config.store.enabled = false;
        }
    }
}

/// Path of the log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tempnet")
        .join("logs")
        .join("tempnet.log")
}

fn after_help() -> String {
    format!("Logs are written to: {}", get_log_path().display())
}
