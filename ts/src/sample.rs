//! Temperature sample record

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One temperature reading taken from a worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSample {
    pub worker_id: usize,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
}

impl TemperatureSample {
    pub fn new(worker_id: usize, timestamp: DateTime<Utc>, temperature: f64) -> Self {
        Self {
            worker_id,
            timestamp,
            temperature,
        }
    }

    /// Sample stamped with the current time
    pub fn now(worker_id: usize, temperature: f64) -> Self {
        Self::new(worker_id, Utc::now(), temperature)
    }
}

/// Summary over a set of samples
#[derive(Debug, Clone, PartialEq)]
pub struct SampleStats {
    pub count: usize,
    pub workers: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
}

impl SampleStats {
    /// Summarize samples, `None` when there are none
    pub fn from_samples(samples: &[TemperatureSample]) -> Option<Self> {
        let first = samples.first()?;
        let mut stats = Self {
            count: 0,
            workers: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            first: first.timestamp,
            last: first.timestamp,
        };
        let mut workers = BTreeSet::new();
        let mut sum = 0.0;

        for s in samples {
            stats.count += 1;
            stats.min = stats.min.min(s.temperature);
            stats.max = stats.max.max(s.temperature);
            stats.first = stats.first.min(s.timestamp);
            stats.last = stats.last.max(s.timestamp);
            sum += s.temperature;
            workers.insert(s.worker_id);
        }

        stats.workers = workers.len();
        stats.mean = sum / stats.count as f64;
        Some(stats)
    }
}
