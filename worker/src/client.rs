use std::time::Duration;

use anyhow::Result;
use mr_common::{
    DoneReply, GetTaskReply, GetTaskRequest, ReportTaskReply, ReportTaskRequest, TaskKind,
};
use reqwest::Client;

/// Typed wrapper over the coordinator's HTTP API.
#[derive(Clone)]
pub struct CoordinatorClient {
    http: Client,
    base_url: String,
}

impl CoordinatorClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().no_proxy().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_task(&self, worker_id: &str) -> Result<GetTaskReply> {
        let url = format!("{}/api/v1/tasks/next", self.base_url);
        let reply = self
            .http
            .post(&url)
            .json(&GetTaskRequest {
                worker_id: Some(worker_id.to_string()),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reply)
    }

    pub async fn report_task(
        &self,
        worker_id: &str,
        kind: TaskKind,
        seq: usize,
        success: bool,
    ) -> Result<ReportTaskReply> {
        let url = format!("{}/api/v1/tasks/report", self.base_url);
        let reply = self
            .http
            .post(&url)
            .json(&ReportTaskRequest {
                task_type: kind,
                seq,
                success,
                worker_id: Some(worker_id.to_string()),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reply)
    }

    pub async fn done(&self) -> Result<bool> {
        let url = format!("{}/api/v1/job/done", self.base_url);
        let reply: DoneReply = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reply.done)
    }
}
