//! TempNet configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::NetworkError;

/// Main TempNet configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Simulation and coordination parameters
    pub network: NetworkConfig,

    /// Temperature sample storage
    pub store: StoreConfig,

    /// Terminal status display
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tempnet.yml
        let local_config = PathBuf::from(".tempnet.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tempnet/tempnet.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tempnet").join("tempnet.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => [
                Some(PathBuf::from(".tempnet.yml")),
                dirs::config_dir().map(|d| d.join("tempnet").join("tempnet.yml")),
            ]
            .into_iter()
            .flatten()
            .collect(),
        };

        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

/// Simulation and coordination parameters
///
/// Passed by value into the coordinator and cloned into every worker; nothing
/// here is mutated after startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Number of workers to spawn
    pub number_of_workers: usize,

    /// Temperature every worker starts at
    pub starting_temperature: f64,

    /// Floor an inactive worker cools towards
    pub min_temperature: f64,

    /// Ceiling an active worker heats towards; reaching it is an overheat
    pub max_temperature: f64,

    /// Upper bound of the random per-tick heating step
    pub max_adjustment_step: f64,

    /// Average below which the coordinator switches a worker on
    pub low_temperature_threshold: f64,

    /// Average above which the coordinator switches a worker off
    pub high_temperature_threshold: f64,

    /// Worker temperature tick in milliseconds
    pub worker_tick_ms: u64,

    /// Coordinator control tick in milliseconds
    pub coordinator_tick_ms: u64,

    /// Chance per control tick of a random activation flip
    pub chaos_probability: f64,

    /// Capacity of each worker's inbound channel
    pub inbound_capacity: usize,

    /// Seed for reproducible runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        debug!("NetworkConfig::default: called");
        Self {
            number_of_workers: 10,
            starting_temperature: 20.0,
            min_temperature: 10.0,
            max_temperature: 30.0,
            max_adjustment_step: 0.5,
            low_temperature_threshold: 15.0,
            high_temperature_threshold: 25.0,
            worker_tick_ms: 500,
            coordinator_tick_ms: 1000,
            chaos_probability: 0.5,
            inbound_capacity: 64,
            seed: None,
        }
    }
}

impl NetworkConfig {
    /// Get the worker tick as a Duration
    pub fn worker_tick(&self) -> Duration {
        Duration::from_millis(self.worker_tick_ms)
    }

    /// Get the coordinator tick as a Duration
    pub fn coordinator_tick(&self) -> Duration {
        Duration::from_millis(self.coordinator_tick_ms)
    }

    /// Check the parameters describe a consistent network
    pub fn validate(&self) -> Result<(), NetworkError> {
        debug!(?self, "NetworkConfig::validate: called");
        let fail = |msg: String| Err(NetworkError::InvalidConfig(msg));

        if self.number_of_workers == 0 {
            return fail("number-of-workers must be at least 1".to_string());
        }
        let temps = [
            self.starting_temperature,
            self.min_temperature,
            self.max_temperature,
            self.max_adjustment_step,
            self.low_temperature_threshold,
            self.high_temperature_threshold,
        ];
        if temps.iter().any(|t| !t.is_finite()) {
            return fail("temperatures must be finite".to_string());
        }
        if self.min_temperature >= self.max_temperature {
            return fail(format!(
                "min-temperature {} must be below max-temperature {}",
                self.min_temperature, self.max_temperature
            ));
        }
        if !(self.min_temperature..=self.max_temperature).contains(&self.starting_temperature) {
            return fail(format!(
                "starting-temperature {} must lie within [{}, {}]",
                self.starting_temperature, self.min_temperature, self.max_temperature
            ));
        }
        if self.low_temperature_threshold >= self.high_temperature_threshold {
            return fail(format!(
                "low-temperature-threshold {} must be below high-temperature-threshold {}",
                self.low_temperature_threshold, self.high_temperature_threshold
            ));
        }
        if self.max_adjustment_step < 0.0 {
            return fail(format!(
                "max-adjustment-step {} must not be negative",
                self.max_adjustment_step
            ));
        }
        if self.worker_tick_ms == 0 || self.coordinator_tick_ms == 0 {
            return fail("tick intervals must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.chaos_probability) {
            return fail(format!(
                "chaos-probability {} must lie within [0, 1]",
                self.chaos_probability
            ));
        }
        if self.inbound_capacity == 0 {
            return fail("inbound-capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Temperature sample storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Record samples from every data response
    pub enabled: bool,

    /// JSONL file to append to (default: platform data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl StoreConfig {
    /// Configured path or the default location
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(tempstore::JsonlStore::default_path)
    }
}

/// Terminal status display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Render the status table on every status change
    pub enabled: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
