//! Last reported temperature per worker

use serde::{Deserialize, Serialize};

use super::WorkerId;
use crate::error::NetworkError;

/// A worker's most recently reported temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkerTemperature {
    pub id: WorkerId,
    pub temperature: f64,
}

impl WorkerTemperature {
    pub fn new(id: WorkerId, temperature: f64) -> Self {
        Self { id, temperature }
    }
}

/// Ordered collection of worker temperatures, indexed by worker id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerTemperatureList {
    entries: Vec<WorkerTemperature>,
}

impl WorkerTemperatureList {
    pub fn new(entries: Vec<WorkerTemperature>) -> Self {
        Self { entries }
    }

    /// Every worker at the same temperature
    pub fn uniform(count: usize, temperature: f64) -> Self {
        Self::new((0..count).map(|id| WorkerTemperature::new(id, temperature)).collect())
    }

    pub fn entries(&self) -> &[WorkerTemperature] {
        &self.entries
    }

    /// Temperature last reported by a worker
    pub fn get(&self, id: WorkerId) -> Option<f64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.temperature)
    }

    /// Replace the reading for an existing worker
    pub fn set(&mut self, id: WorkerId, temperature: f64) -> Result<(), NetworkError> {
        let workers = self.entries.len();
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(NetworkError::UnknownWorkerId { id, workers })?;
        entry.temperature = temperature;
        Ok(())
    }

    /// Arithmetic mean over all entries
    pub fn average_temperature(&self) -> Result<f64, NetworkError> {
        if self.entries.is_empty() {
            return Err(NetworkError::EmptyTemperatureList);
        }
        let sum: f64 = self.entries.iter().map(|e| e.temperature).sum();
        Ok(sum / self.entries.len() as f64)
    }
}
