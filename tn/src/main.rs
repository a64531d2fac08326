//! TempNet - simulated temperature-control worker network
//!
//! CLI entry point for running the network.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tempnet::cli::{Cli, Command, RunArgs, get_log_path};
use tempnet::config::Config;
use tempnet::coordinator::{Coordinator, ShutdownReport};
use tempnet::display::{ConsoleDisplay, NullDisplay, StatusDisplay};
use tempstore::{JsonlStore, TemperatureStore};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Run(args)) => cmd_run(config, &args).await,
        Some(Command::Config) => cmd_config(&config),
        None => cmd_run(config, &RunArgs::default()).await,
    }
}

fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    print!("{}", config.to_yaml()?);
    Ok(())
}

async fn cmd_run(mut config: Config, args: &RunArgs) -> Result<()> {
    debug!(?args, "cmd_run: called");
    args.apply_to(&mut config);

    let display: Arc<dyn StatusDisplay> = if config.display.enabled {
        Arc::new(ConsoleDisplay)
    } else {
        Arc::new(NullDisplay)
    };

    let store: Option<Arc<dyn TemperatureStore>> = if config.store.enabled {
        let path = config.store.resolved_path();
        let store = JsonlStore::open(&path).context(format!("Failed to open sample store {}", path.display()))?;
        info!(path = %path.display(), "Recording samples");
        Some(Arc::new(store))
    } else {
        None
    };

    let coordinator =
        Coordinator::new(config.network.clone(), display, store).context("Failed to build worker network")?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    let coordinator_handle = tokio::spawn(coordinator.run(shutdown_rx));

    info!(
        workers = config.network.number_of_workers,
        duration = ?args.duration,
        "Network running. Press Ctrl+C to stop."
    );

    wait_for_stop(args.duration.map(Duration::from_secs)).await?;
    let _ = shutdown_tx.send(()).await;

    let report = coordinator_handle.await.context("Coordinator task panicked")??;
    print_report(&report);
    Ok(())
}

/// Block until a stop signal arrives or the duration elapses
async fn wait_for_stop(duration: Option<Duration>) -> Result<()> {
    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => warn!("SIGINT received"),
            _ = sigterm.recv() => warn!("SIGTERM received"),
            _ = deadline => info!("Run duration elapsed"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                warn!("Ctrl+C received");
            }
            _ = deadline => info!("Run duration elapsed"),
        }
    }

    Ok(())
}

fn print_report(report: &ShutdownReport) {
    println!();
    println!("{}", "Shutdown complete".bright_cyan().bold());
    println!("Control ticks: {}", report.ticks);
    println!("Responses handled: {}", report.responses_handled);
    for worker in &report.workers {
        let state = if worker.active { "active".green() } else { "inactive".red() };
        println!(
            "  worker {:>3}  {:8}  {:>6.2} C  {:>5} msgs  {} takeovers",
            worker.id, state, worker.temperature, worker.messages_processed, worker.takeovers_signalled
        );
    }
    if let Ok(avg) = report.temperatures.average_temperature() {
        println!("Average temperature: {:.2} C", avg);
    }
}
