use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use mr_common::{MapReduceApp, Task, WorkerId};
use tokio::time::sleep;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{client::CoordinatorClient, config::WorkerConfig, executor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The coordinator reported the job done.
    JobDone,
    /// A coordinator request failed; the job is assumed finished or gone.
    CoordinatorUnreachable,
}

#[derive(Debug, Clone)]
pub struct WorkerSummary {
    pub worker_id: WorkerId,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
    pub exit_reason: ExitReason,
}

pub struct Worker {
    id: WorkerId,
    hostname: String,
    app: Arc<dyn MapReduceApp>,
    client: CoordinatorClient,
    work_dir: PathBuf,
    backoff: Duration,
}

impl Worker {
    pub fn new(app: Arc<dyn MapReduceApp>, config: WorkerConfig) -> Result<Self> {
        let client = CoordinatorClient::new(&config.coordinator_url, config.request_timeout)?;
        let hostname = hostname::get()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            hostname,
            app,
            client,
            work_dir: config.work_dir,
            backoff: config.backoff,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Polls for tasks until the job is done or the coordinator stops
    /// answering.
    pub async fn run(self) -> WorkerSummary {
        let span = info_span!("worker", id = %self.id, host = %self.hostname);
        self.run_loop().instrument(span).await
    }

    async fn run_loop(self) -> WorkerSummary {
        info!(
            "worker started with app '{}' against {}",
            self.app.name(),
            self.client.base_url()
        );

        let mut summary = WorkerSummary {
            worker_id: self.id.clone(),
            tasks_completed: 0,
            tasks_failed: 0,
            exit_reason: ExitReason::CoordinatorUnreachable,
        };

        loop {
            let reply = match self.client.get_task(&self.id).await {
                Ok(r) => r,
                Err(e) => {
                    info!("coordinator unreachable ({:#}), exiting", e);
                    break;
                }
            };

            let Some(task) = reply.task else {
                if reply.wait {
                    match self.client.done().await {
                        Ok(true) => {
                            summary.exit_reason = ExitReason::JobDone;
                            break;
                        }
                        Ok(false) => {}
                        Err(e) => {
                            info!("coordinator unreachable ({:#}), exiting", e);
                            break;
                        }
                    }
                }
                debug!("nothing to do, waiting {:?}", self.backoff);
                sleep(self.backoff).await;
                continue;
            };

            let success = self.execute(&task, reply.n_reduce, reply.n_map).await;
            if success {
                summary.tasks_completed += 1;
            } else {
                summary.tasks_failed += 1;
            }

            if let Err(e) = self
                .client
                .report_task(&self.id, task.kind, task.seq, success)
                .await
            {
                warn!("could not report {} task {}: {:#}", task.kind, task.seq, e);
            }
        }

        info!(
            "worker exiting ({:?}): {} tasks done, {} failed",
            summary.exit_reason, summary.tasks_completed, summary.tasks_failed
        );
        summary
    }

    /// Runs the task on the blocking pool. A panic or error counts as a
    /// failure.
    async fn execute(&self, task: &Task, n_reduce: usize, n_map: usize) -> bool {
        info!(
            "got {} task {} (attempt {}, source={:?})",
            task.kind, task.seq, task.attempt, task.source
        );

        let app = self.app.clone();
        let work_dir = self.work_dir.clone();
        let owned = task.clone();
        let result = tokio::task::spawn_blocking(move || {
            executor::execute(app.as_ref(), &owned, n_reduce, n_map, &work_dir)
        })
        .await
        .map_err(|e| anyhow!("task panicked: {}", e))
        .and_then(|r| r);

        match result {
            Ok(files) => {
                info!("{} task {} done, wrote {} files", task.kind, task.seq, files.len());
                true
            }
            Err(e) => {
                warn!("{} task {} failed: {:#}", task.kind, task.seq, e);
                false
            }
        }
    }
}
