use chrono::{DateTime, Utc};
use mr_common::{JobPhase, JobSnapshot, StatusCounts, Task, TaskKind, TaskStatus};

use crate::error::SchedulerError;

/// What a report did to the task tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Completed,
    /// Completed the last map task and opened the reduce phase.
    PhaseAdvanced,
    /// Success for a task that was already completed.
    AlreadyCompleted,
    /// Failure for an assigned task, which is available again.
    Released,
    /// Nothing changed.
    Ignored,
}

/// Authoritative task tables for one job.
///
/// Both tables are sized at creation and never grow. Callers serialize
/// access; every method here is a single atomic step of the state machine.
#[derive(Debug)]
pub struct JobState {
    map_tasks: Vec<Task>,
    reduce_tasks: Vec<Task>,
    phase_advanced: bool,
    started_at: DateTime<Utc>,
}

impl JobState {
    pub fn new(inputs: Vec<String>, n_reduce: usize) -> Result<Self, SchedulerError> {
        if n_reduce == 0 {
            return Err(SchedulerError::InvalidPartitionCount);
        }

        let map_tasks: Vec<Task> = inputs
            .into_iter()
            .enumerate()
            .map(|(seq, source)| Task::map(seq, source))
            .collect();
        let reduce_tasks = (0..n_reduce).map(Task::reduce).collect();

        // no inputs: the map phase is vacuously complete
        let phase_advanced = map_tasks.is_empty();

        Ok(Self {
            map_tasks,
            reduce_tasks,
            phase_advanced,
            started_at: Utc::now(),
        })
    }

    pub fn n_map(&self) -> usize {
        self.map_tasks.len()
    }

    pub fn n_reduce(&self) -> usize {
        self.reduce_tasks.len()
    }

    pub fn phase_advanced(&self) -> bool {
        self.phase_advanced
    }

    pub fn tasks(&self, kind: TaskKind) -> &[Task] {
        match kind {
            TaskKind::Map => &self.map_tasks,
            TaskKind::Reduce => &self.reduce_tasks,
        }
    }

    fn task_mut(&mut self, kind: TaskKind, seq: usize) -> Result<&mut Task, SchedulerError> {
        let table = match kind {
            TaskKind::Map => &mut self.map_tasks,
            TaskKind::Reduce => &mut self.reduce_tasks,
        };
        let len = table.len();
        table
            .get_mut(seq)
            .ok_or(SchedulerError::UnknownTask { kind, seq, len })
    }

    pub fn phase(&self) -> JobPhase {
        if !self.phase_advanced {
            JobPhase::Map
        } else if self.is_done() {
            JobPhase::Done
        } else {
            JobPhase::Reduce
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase_advanced && self.reduce_tasks.iter().all(Task::is_completed)
    }

    /// Hands out the lowest-numbered available task of the current phase.
    /// `None` means the caller should wait (or that the job is done).
    pub fn assign_next(&mut self) -> Option<Task> {
        let table = if self.phase_advanced {
            &mut self.reduce_tasks
        } else {
            &mut self.map_tasks
        };

        let task = table
            .iter_mut()
            .find(|t| t.status == TaskStatus::Available)?;
        task.status = TaskStatus::Assigned;
        task.attempt += 1;
        task.assigned_at = Some(Utc::now());
        Some(task.clone())
    }

    pub fn report(
        &mut self,
        kind: TaskKind,
        seq: usize,
        success: bool,
    ) -> Result<ReportOutcome, SchedulerError> {
        let phase_advanced = self.phase_advanced;
        let task = self.task_mut(kind, seq)?;

        // reduce tasks are never handed out before the phase advances
        if kind == TaskKind::Reduce && !phase_advanced {
            return Ok(ReportOutcome::Ignored);
        }

        if !success {
            return Ok(match task.status {
                TaskStatus::Assigned => {
                    task.status = TaskStatus::Available;
                    ReportOutcome::Released
                }
                TaskStatus::Available | TaskStatus::Completed => ReportOutcome::Ignored,
            });
        }

        if task.is_completed() {
            return Ok(ReportOutcome::AlreadyCompleted);
        }
        // a late success for a reclaimed task still counts
        task.status = TaskStatus::Completed;

        if kind == TaskKind::Map
            && !self.phase_advanced
            && self.map_tasks.iter().all(Task::is_completed)
        {
            self.phase_advanced = true;
            return Ok(ReportOutcome::PhaseAdvanced);
        }
        Ok(ReportOutcome::Completed)
    }

    /// Reverts the task to available if it is still assigned under `attempt`.
    pub fn reclaim(&mut self, kind: TaskKind, seq: usize, attempt: u32) -> bool {
        match self.task_mut(kind, seq) {
            Ok(task) if task.status == TaskStatus::Assigned && task.attempt == attempt => {
                task.status = TaskStatus::Available;
                true
            }
            _ => false,
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            phase: self.phase(),
            n_map: self.n_map(),
            n_reduce: self.n_reduce(),
            started_at: self.started_at,
            map_counts: StatusCounts::from_tasks(&self.map_tasks),
            reduce_counts: StatusCounts::from_tasks(&self.reduce_tasks),
            map_tasks: self.map_tasks.clone(),
            reduce_tasks: self.reduce_tasks.clone(),
            done: self.is_done(),
        }
    }
}
