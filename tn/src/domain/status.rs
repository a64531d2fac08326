//! Worker activity status

use serde::{Deserialize, Serialize};

/// Index of a worker in `[0, N)`
pub type WorkerId = usize;

/// Whether a worker is currently active (heating) or inactive (cooling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub id: WorkerId,
    pub active: bool,
}

impl WorkerStatus {
    pub fn new(id: WorkerId, active: bool) -> Self {
        Self { id, active }
    }

    /// One all-active entry per worker, in id order
    pub fn all_active(count: usize) -> Vec<Self> {
        (0..count).map(|id| Self::new(id, true)).collect()
    }
}
