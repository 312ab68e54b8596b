//! Coordinator side of the job: task tables, scheduling, crash detection
//! and the HTTP coordination channel workers talk to.

pub mod config;
pub mod error;
pub mod handlers;
pub mod inputs;
pub mod monitor;
pub mod scheduler;
pub mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tracing::info;

pub use config::CoordinatorConfig;
pub use error::SchedulerError;
pub use scheduler::Scheduler;

use crate::state::JobState;

/// A running job. The driver polls [`CoordinatorHandle::done`].
pub struct CoordinatorHandle {
    scheduler: Scheduler,
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: JoinHandle<std::io::Result<()>>,
}

impl CoordinatorHandle {
    pub fn done(&self) -> bool {
        self.scheduler.done()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL workers should use.
    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Stops accepting requests and waits for in-flight ones to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.server.await.context("coordinator server task panicked")??;
        info!("coordinator on {} stopped", self.local_addr);
        Ok(())
    }
}

/// Creates the job (one map task per input, `n_reduce` reduce tasks) and
/// starts serving the coordination channel.
pub async fn start(
    inputs: Vec<String>,
    n_reduce: usize,
    config: CoordinatorConfig,
) -> Result<CoordinatorHandle> {
    let state = JobState::new(inputs, n_reduce)?;
    info!(
        "job created with {} map tasks and {} reduce tasks",
        state.n_map(),
        state.n_reduce()
    );

    let scheduler = Scheduler::new(state, config.task_timeout);
    let app = handlers::build_router(scheduler.clone());

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("cannot listen on {}", config.addr))?;
    let local_addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    info!(
        "coordinator listening on {} (task timeout {:?})",
        local_addr, config.task_timeout
    );

    Ok(CoordinatorHandle {
        scheduler,
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        server,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn local_config() -> CoordinatorConfig {
        CoordinatorConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            task_timeout: Duration::from_secs(60),
            done_grace: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn start_binds_and_shuts_down() {
        let handle = start(vec!["a.txt".into()], 2, local_config()).await.unwrap();
        assert_ne!(handle.local_addr().port(), 0);
        assert!(!handle.done());
        assert!(handle.url().starts_with("http://127.0.0.1:"));
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn start_rejects_zero_partitions() {
        assert!(start(vec!["a.txt".into()], 0, local_config()).await.is_err());
    }
}
