//! CLI argument parsing for tempstore

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tempstore")]
#[command(author, version, about = "Query recorded worker temperature samples", long_about = None)]
pub struct Cli {
    /// Path to the JSONL sample file (default: platform data dir)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every sample
    List {
        /// Only show the last N samples
        #[arg(short, long)]
        tail: Option<usize>,
    },

    /// Show the first sample recorded for a worker
    Worker {
        /// Worker ID
        #[arg(required = true)]
        worker_id: usize,
    },

    /// Print samples inside a time window (RFC 3339, inclusive)
    Range {
        /// Window start, e.g. 2026-10-18T09:00:00Z
        #[arg(required = true)]
        start: DateTime<Utc>,

        /// Window end
        #[arg(required = true)]
        end: DateTime<Utc>,
    },

    /// Summary statistics
    Stats,
}
