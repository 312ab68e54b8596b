use std::{net::SocketAddr, time::Duration};

use anyhow::Result;
use mr_common::env::env_or;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_TASK_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DONE_GRACE_SECS: u64 = 3;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Address the coordination channel listens on. Port 0 picks a free one.
    pub addr: SocketAddr,
    /// How long an assigned task may go unreported before it is reclaimed.
    pub task_timeout: Duration,
    /// How long the driver keeps serving after the job is done, so polling
    /// workers can observe it.
    pub done_grace: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            task_timeout: Duration::from_secs(DEFAULT_TASK_TIMEOUT_SECS),
            done_grace: Duration::from_secs(DEFAULT_DONE_GRACE_SECS),
        }
    }
}

impl CoordinatorConfig {
    /// - `MR_COORDINATOR_ADDR` (default 127.0.0.1:8080)
    /// - `MR_TASK_TIMEOUT_SECS` (default 10)
    /// - `MR_DONE_GRACE_SECS` (default 3)
    pub fn from_env() -> Result<Self> {
        let addr: SocketAddr = env_or("MR_COORDINATOR_ADDR", DEFAULT_ADDR.parse()?)?;
        let timeout = env_or("MR_TASK_TIMEOUT_SECS", DEFAULT_TASK_TIMEOUT_SECS)?;
        let grace = env_or("MR_DONE_GRACE_SECS", DEFAULT_DONE_GRACE_SECS)?;

        Ok(Self {
            addr,
            task_timeout: Duration::from_secs(timeout),
            done_grace: Duration::from_secs(grace),
        })
    }
}
