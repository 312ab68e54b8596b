use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskKind, TaskStatus};

pub type WorkerId = String;

/* --------- Coordination channel --------- */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetTaskRequest {
    /// Only used to correlate coordinator logs with a worker.
    #[serde(default)]
    pub worker_id: Option<WorkerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTaskReply {
    pub task: Option<Task>,
    pub n_reduce: usize,
    pub n_map: usize,
    /// No task right now. Does not mean the job is done, ask `done` for that.
    pub wait: bool,
}

impl GetTaskReply {
    pub fn assigned(task: Task, n_reduce: usize, n_map: usize) -> Self {
        Self {
            task: Some(task),
            n_reduce,
            n_map,
            wait: false,
        }
    }

    pub fn wait(n_reduce: usize, n_map: usize) -> Self {
        Self {
            task: None,
            n_reduce,
            n_map,
            wait: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTaskRequest {
    pub task_type: TaskKind,
    pub seq: usize,
    pub success: bool,
    #[serde(default)]
    pub worker_id: Option<WorkerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTaskReply {
    pub received: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoneReply {
    pub done: bool,
}

/* --------- Job inspection --------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPhase {
    Map,
    Reduce,
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub available: usize,
    pub assigned: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut acc, t| {
            match t.status {
                TaskStatus::Available => acc.available += 1,
                TaskStatus::Assigned => acc.assigned += 1,
                TaskStatus::Completed => acc.completed += 1,
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub phase: JobPhase,
    pub n_map: usize,
    pub n_reduce: usize,
    pub started_at: DateTime<Utc>,
    pub map_counts: StatusCounts,
    pub reduce_counts: StatusCounts,
    pub map_tasks: Vec<Task>,
    pub reduce_tasks: Vec<Task>,
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_counts_cover_every_task() {
        let mut tasks = vec![Task::reduce(0), Task::reduce(1), Task::reduce(2)];
        tasks[1].status = TaskStatus::Assigned;
        tasks[2].status = TaskStatus::Completed;

        let counts = StatusCounts::from_tasks(&tasks);
        assert_eq!(
            counts,
            StatusCounts {
                available: 1,
                assigned: 1,
                completed: 1
            }
        );
    }

    #[test]
    fn get_task_request_accepts_empty_body() {
        let req: GetTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(req.worker_id.is_none());
    }

    #[test]
    fn report_request_uses_task_type_names() {
        let req: ReportTaskRequest =
            serde_json::from_str(r#"{"task_type":"map","seq":4,"success":false}"#).unwrap();
        assert_eq!(req.task_type, TaskKind::Map);
        assert_eq!(req.seq, 4);
        assert!(!req.success);
    }
}
