//! Simulated workers

mod actor;
mod state;

pub use actor::{Worker, WorkerReport, worker_rng};
pub use state::WorkerState;
