use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use mr_common::env::env_or;

pub const DEFAULT_COORDINATOR_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_BACKOFF_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub coordinator_url: String,
    /// Where partition and output files are published.
    pub work_dir: PathBuf,
    /// Sleep between polls while the coordinator says wait.
    pub backoff: Duration,
    pub request_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            coordinator_url: DEFAULT_COORDINATOR_URL.to_string(),
            work_dir: PathBuf::from("."),
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl WorkerConfig {
    /// - `MR_COORDINATOR_URL` (default http://127.0.0.1:8080)
    /// - `MR_WORK_DIR` (default `.`)
    /// - `MR_BACKOFF_MS` (default 1000)
    pub fn from_env() -> Result<Self> {
        let coordinator_url = env_or("MR_COORDINATOR_URL", DEFAULT_COORDINATOR_URL.to_string())?;
        let work_dir = env_or("MR_WORK_DIR", PathBuf::from("."))?;
        let backoff_ms = env_or("MR_BACKOFF_MS", DEFAULT_BACKOFF_MS)?;

        Ok(Self {
            coordinator_url,
            work_dir,
            backoff: Duration::from_millis(backoff_ms),
            ..Self::default()
        })
    }
}
