use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which phase a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Reads one input record and emits partitioned key/value pairs.
    Map,
    /// Reads every partition file of one bucket and writes grouped output.
    Reduce,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Map => f.write_str("map"),
            TaskKind::Reduce => f.write_str("reduce"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Available,
    Assigned,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub kind: TaskKind,
    /// Dense index within its kind, starting at 0.
    pub seq: usize,
    pub status: TaskStatus,

    /// Input record name for map tasks. Reduce tasks locate their inputs
    /// by sequence number instead.
    pub source: Option<String>,

    /// How many times the task has been handed out.
    pub attempt: u32,
    /// When the task was last handed out.
    pub assigned_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn map(seq: usize, source: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Map,
            seq,
            status: TaskStatus::Available,
            source: Some(source.into()),
            attempt: 0,
            assigned_at: None,
        }
    }

    pub fn reduce(seq: usize) -> Self {
        Self {
            kind: TaskKind::Reduce,
            seq,
            status: TaskStatus::Available,
            source: None,
            attempt: 0,
            assigned_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tasks_start_available() {
        let m = Task::map(3, "pg-grimm.txt");
        assert_eq!(m.kind, TaskKind::Map);
        assert_eq!(m.status, TaskStatus::Available);
        assert_eq!(m.source.as_deref(), Some("pg-grimm.txt"));
        assert_eq!(m.attempt, 0);

        let r = Task::reduce(1);
        assert_eq!(r.kind, TaskKind::Reduce);
        assert!(r.source.is_none());
        assert!(!r.is_completed());
    }

    #[test]
    fn kind_and_status_wire_names() {
        assert_eq!(serde_json::to_string(&TaskKind::Map).unwrap(), "\"map\"");
        assert_eq!(serde_json::to_string(&TaskKind::Reduce).unwrap(), "\"reduce\"");
        assert_eq!(
            serde_json::to_string(&TaskStatus::Assigned).unwrap(),
            "\"ASSIGNED\""
        );
        assert_eq!(TaskKind::Reduce.to_string(), "reduce");
    }
}
