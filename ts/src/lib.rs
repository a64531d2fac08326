//! TempStore - historical temperature samples
//!
//! Stores the per-worker temperature readings a coordinator collects, and
//! answers the handful of queries the tooling needs (all samples, first
//! sample of a worker, samples inside a time window).
//!
//! # Backends
//!
//! - [`MemoryStore`] keeps samples in a `Vec` for the lifetime of the process
//! - [`JsonlStore`] appends one JSON object per line to a file
//!
//! The file format is JSON lines, not CSV. There is no header row: every
//! line names its own fields (`workerId`, `timestamp`, `temperature`), so a
//! CSV sample file from other tooling has to be converted before it can be
//! opened here.
//!
//! ```text
//! samples.jsonl
//! {"workerId":0,"timestamp":"2026-10-18T09:00:00Z","temperature":20.4}
//! {"workerId":1,"timestamp":"2026-10-18T09:00:00Z","temperature":19.9}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tempstore::{JsonlStore, TemperatureStore};
//!
//! let store = JsonlStore::open("samples.jsonl")?;
//! store.add_sample(TemperatureSample::now(3, 21.5)).await?;
//! let window = store.get_by_time_range(start, end).await?;
//! ```

pub mod cli;
mod error;
mod jsonl;
mod memory;
mod sample;

pub use error::{StoreError, StoreResult};
pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use sample::{SampleStats, TemperatureSample};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Default file name for the JSONL backend
pub const DEFAULT_STORE_FILE: &str = "samples.jsonl";

/// Storage for temperature samples
///
/// Implementations must be safe to share between tasks; the coordinator holds
/// one behind an `Arc` and writes from its response loop.
#[async_trait]
pub trait TemperatureStore: Send + Sync {
    /// Record a sample
    async fn add_sample(&self, sample: TemperatureSample) -> StoreResult<()>;

    /// All samples in insertion order
    async fn get_all(&self) -> StoreResult<Vec<TemperatureSample>>;

    /// First sample recorded for a worker
    async fn get_by_worker_id(&self, worker_id: usize) -> StoreResult<TemperatureSample>;

    /// Samples with `start <= timestamp <= end`, in insertion order
    async fn get_by_time_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<Vec<TemperatureSample>>;
}

/// Pick the first sample for a worker out of a slice
pub(crate) fn first_for_worker(samples: &[TemperatureSample], worker_id: usize) -> StoreResult<TemperatureSample> {
    samples
        .iter()
        .find(|s| s.worker_id == worker_id)
        .cloned()
        .ok_or(StoreError::NotFound { worker_id })
}

/// Filter samples to an inclusive time window
pub(crate) fn within_range(
    samples: impl IntoIterator<Item = TemperatureSample>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<TemperatureSample> {
    samples
        .into_iter()
        .filter(|s| s.timestamp >= start && s.timestamp <= end)
        .collect()
}
