//! In-memory store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{StoreResult, TemperatureSample, TemperatureStore, first_for_worker, within_range};

/// Samples kept in process memory, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    samples: RwLock<Vec<TemperatureSample>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples recorded so far
    pub async fn len(&self) -> usize {
        self.samples.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.samples.read().await.is_empty()
    }
}

#[async_trait]
impl TemperatureStore for MemoryStore {
    async fn add_sample(&self, sample: TemperatureSample) -> StoreResult<()> {
        debug!(worker_id = sample.worker_id, temperature = sample.temperature, "MemoryStore::add_sample");
        self.samples.write().await.push(sample);
        Ok(())
    }

    async fn get_all(&self) -> StoreResult<Vec<TemperatureSample>> {
        Ok(self.samples.read().await.clone())
    }

    async fn get_by_worker_id(&self, worker_id: usize) -> StoreResult<TemperatureSample> {
        first_for_worker(&self.samples.read().await, worker_id)
    }

    async fn get_by_time_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<Vec<TemperatureSample>> {
        let samples = self.samples.read().await;
        Ok(within_range(samples.iter().cloned(), start, end))
    }
}
