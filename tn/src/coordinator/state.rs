//! Authoritative network state held by the coordinator

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{WorkerId, WorkerStatus, WorkerTemperatureList};
use crate::error::{NetworkError, NetworkResult};

/// Status and temperature of every worker
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkState {
    pub statuses: Vec<WorkerStatus>,
    pub temperatures: WorkerTemperatureList,
}

impl NetworkState {
    /// All workers active at the starting temperature
    pub fn initial(workers: usize, starting_temperature: f64) -> Self {
        Self {
            statuses: WorkerStatus::all_active(workers),
            temperatures: WorkerTemperatureList::uniform(workers, starting_temperature),
        }
    }

    /// Reject ids outside `[0, N)`
    pub fn check_id(&self, id: WorkerId) -> NetworkResult<()> {
        if id < self.statuses.len() {
            Ok(())
        } else {
            Err(NetworkError::UnknownWorkerId {
                id,
                workers: self.statuses.len(),
            })
        }
    }

    pub fn set_active(&mut self, id: WorkerId, active: bool) -> NetworkResult<()> {
        self.check_id(id)?;
        let workers = self.statuses.len();
        let status = self
            .statuses
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(NetworkError::UnknownWorkerId { id, workers })?;
        status.active = active;
        Ok(())
    }

    pub fn set_temperature(&mut self, id: WorkerId, temperature: f64) -> NetworkResult<()> {
        self.check_id(id)?;
        self.temperatures.set(id, temperature)
    }
}

/// State shared between the control and response loops
pub type SharedState = Arc<RwLock<NetworkState>>;
