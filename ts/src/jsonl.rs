//! JSON-lines file store
//!
//! Every sample is one line of JSON appended to the file. Appends take an
//! exclusive `fs2` lock so several writers (or a writer and the CLI) never
//! interleave partial lines; reads take a shared lock.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use tracing::{debug, info};

use crate::{StoreError, StoreResult, TemperatureSample, TemperatureStore, first_for_worker, within_range};

/// Append-only JSONL store
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Open or create a store file at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        info!(path = %path.display(), "Opened JSONL temperature store");
        Ok(Self { path })
    }

    /// Default location under the platform data directory
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tempnet")
            .join(crate::DEFAULT_STORE_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_blocking(path: &Path, sample: &TemperatureSample) -> StoreResult<()> {
        let mut line = serde_json::to_string(sample)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StoreError::io(path, e))?;
        file.lock_exclusive().map_err(|e| StoreError::io(path, e))?;
        let written = file.write_all(line.as_bytes()).and_then(|_| file.flush());
        let unlocked = FileExt::unlock(&file);
        written.map_err(|e| StoreError::io(path, e))?;
        unlocked.map_err(|e| StoreError::io(path, e))
    }

    fn read_blocking(path: &Path) -> StoreResult<Vec<TemperatureSample>> {
        let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
        file.lock_shared().map_err(|e| StoreError::io(path, e))?;

        let mut samples = Vec::new();
        let mut result = Ok(());
        for (idx, line) in BufReader::new(&file).lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    result = Err(StoreError::io(path, e));
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TemperatureSample>(&line) {
                Ok(sample) => samples.push(sample),
                Err(source) => {
                    result = Err(StoreError::Corrupt {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        source,
                    });
                    break;
                }
            }
        }

        FileExt::unlock(&file).map_err(|e| StoreError::io(path, e))?;
        result?;
        debug!(path = %path.display(), count = samples.len(), "JsonlStore: read samples");
        Ok(samples)
    }

    async fn read_all(&self) -> StoreResult<Vec<TemperatureSample>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::read_blocking(&path))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl TemperatureStore for JsonlStore {
    async fn add_sample(&self, sample: TemperatureSample) -> StoreResult<()> {
        debug!(worker_id = sample.worker_id, temperature = sample.temperature, "JsonlStore::add_sample");
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::append_blocking(&path, &sample))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    async fn get_all(&self) -> StoreResult<Vec<TemperatureSample>> {
        self.read_all().await
    }

    async fn get_by_worker_id(&self, worker_id: usize) -> StoreResult<TemperatureSample> {
        first_for_worker(&self.read_all().await?, worker_id)
    }

    async fn get_by_time_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<Vec<TemperatureSample>> {
        Ok(within_range(self.read_all().await?, start, end))
    }
}
