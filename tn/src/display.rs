//! Worker status display

use colored::Colorize;
use std::fmt::Write as _;
use std::io;
use tracing::warn;

use crate::domain::{WorkerStatus, WorkerTemperatureList};

/// Receives the network state after every status change
///
/// Called from the response loop, so implementations must return quickly.
pub trait StatusDisplay: Send + Sync {
    fn display_worker_status(&self, statuses: &[WorkerStatus], temperatures: &WorkerTemperatureList);
}

/// Prints a status table to stdout
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl StatusDisplay for ConsoleDisplay {
    fn display_worker_status(&self, statuses: &[WorkerStatus], temperatures: &WorkerTemperatureList) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = write_table(&mut stdout, statuses, temperatures, true) {
            warn!(error = %e, "Failed to write status table");
        }
    }
}

/// Discards every update
#[derive(Debug, Default)]
pub struct NullDisplay;

impl StatusDisplay for NullDisplay {
    fn display_worker_status(&self, _statuses: &[WorkerStatus], _temperatures: &WorkerTemperatureList) {}
}

/// Write the status table followed by a newline
pub fn write_table<W: io::Write>(
    out: &mut W,
    statuses: &[WorkerStatus],
    temperatures: &WorkerTemperatureList,
    color: bool,
) -> io::Result<()> {
    let mut table = render_table(statuses, temperatures, color);
    table.push('\n');
    out.write_all(table.as_bytes())?;
    out.flush()
}

/// Render the status table
pub fn render_table(statuses: &[WorkerStatus], temperatures: &WorkerTemperatureList, color: bool) -> String {
    let mut out = String::new();
    let header = format!("{:<10} {:<9} {:>11}", "Worker ID", "Status", "Temperature");
    if color {
        let _ = writeln!(out, "{}", header.bright_cyan().bold());
    } else {
        let _ = writeln!(out, "{}", header);
    }

    for status in statuses {
        let label = if status.active { "Active" } else { "Inactive" };
        let label = format!("{:<9}", label);
        let temperature = match temperatures.get(status.id) {
            Some(t) => format!("{:>9.2} C", t),
            None => format!("{:>11}", "-"),
        };
        if color {
            let label = if status.active { label.green() } else { label.red() };
            let _ = writeln!(out, "{:<10} {} {}", status.id, label, temperature);
        } else {
            let _ = writeln!(out, "{:<10} {} {}", status.id, label, temperature);
        }
    }

    if let Ok(avg) = temperatures.average_temperature() {
        let summary = format!("Average: {:.2} C", avg);
        if color {
            let _ = write!(out, "{}", summary.dimmed());
        } else {
            let _ = write!(out, "{}", summary);
        }
    }
    out
}
