//! Worker side of a job: asks the coordinator for tasks, runs them
//! against the local filesystem and reports the outcome.

pub mod client;
pub mod config;
pub mod executor;
pub mod worker;

pub use client::CoordinatorClient;
pub use config::WorkerConfig;
pub use worker::{ExitReason, Worker, WorkerSummary};
