use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use tempstore::cli::{Cli, Command};
use tempstore::{JsonlStore, SampleStats, TemperatureSample, TemperatureStore};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn print_sample(sample: &TemperatureSample) {
    println!(
        "{} worker {:>3}  {:>6.2} °C",
        sample.timestamp.to_rfc3339().dimmed(),
        sample.worker_id.to_string().cyan(),
        sample.temperature
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let path = cli.path.unwrap_or_else(JsonlStore::default_path);
    info!("tempstore reading {}", path.display());

    let store = JsonlStore::open(&path).context(format!("Failed to open store at {}", path.display()))?;

    match cli.command {
        Command::List { tail } => {
            let samples = store.get_all().await?;
            let skip = tail.map(|n| samples.len().saturating_sub(n)).unwrap_or(0);
            if samples.is_empty() {
                println!("No samples recorded");
            }
            for sample in samples.iter().skip(skip) {
                print_sample(sample);
            }
        }
        Command::Worker { worker_id } => {
            let sample = store.get_by_worker_id(worker_id).await?;
            print_sample(&sample);
        }
        Command::Range { start, end } => {
            if start > end {
                return Err(eyre::eyre!("Range start {} is after end {}", start, end));
            }
            let samples = store.get_by_time_range(start, end).await?;
            println!("{} samples between {} and {}", samples.len(), start, end);
            for sample in &samples {
                print_sample(sample);
            }
        }
        Command::Stats => {
            let samples = store.get_all().await?;
            match SampleStats::from_samples(&samples) {
                Some(stats) => {
                    println!("Store: {}", store.path().display().to_string().cyan());
                    println!("  Samples: {}", stats.count);
                    println!("  Workers: {}", stats.workers);
                    println!("  Min/Mean/Max: {:.2} / {:.2} / {:.2} °C", stats.min, stats.mean, stats.max);
                    println!("  From: {}", stats.first.to_rfc3339());
                    println!("  To:   {}", stats.last.to_rfc3339());
                }
                None => println!("No samples recorded"),
            }
        }
    }

    Ok(())
}
