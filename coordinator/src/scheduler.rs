use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use mr_common::{
    GetTaskReply, JobSnapshot, ReportTaskReply, ReportTaskRequest, TaskKind,
};
use tracing::{debug, info, warn};

use crate::error::SchedulerError;
use crate::monitor;
use crate::state::{JobState, ReportOutcome};

/// Cloneable handle to the job state. Every operation takes the one lock,
/// does its scan or flip, and releases it before any await point.
#[derive(Clone)]
pub struct Scheduler {
    state: Arc<Mutex<JobState>>,
    task_timeout: Duration,
}

impl Scheduler {
    pub fn new(state: JobState, task_timeout: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            task_timeout,
        }
    }

    // The state never holds a half-applied transition, so a poisoned lock
    // is still consistent.
    fn lock(&self) -> MutexGuard<'_, JobState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn task_timeout(&self) -> Duration {
        self.task_timeout
    }

    /// Hands out the next task and starts its crash detector.
    /// Must be called from within a tokio runtime.
    pub fn get_task(&self, worker_id: Option<&str>) -> GetTaskReply {
        let worker = worker_id.unwrap_or("-");

        let reply = {
            let mut state = self.lock();
            let (n_reduce, n_map) = (state.n_reduce(), state.n_map());
            match state.assign_next() {
                Some(task) => {
                    info!(
                        "assigning {} task {} (attempt {}) to worker {}",
                        task.kind, task.seq, task.attempt, worker
                    );
                    GetTaskReply::assigned(task, n_reduce, n_map)
                }
                None => {
                    debug!("no task available for worker {}, telling it to wait", worker);
                    GetTaskReply::wait(n_reduce, n_map)
                }
            }
        };

        if let Some(task) = &reply.task {
            monitor::spawn_crash_detector(self.clone(), task.kind, task.seq, task.attempt);
        }
        reply
    }

    pub fn report_task(&self, req: &ReportTaskRequest) -> Result<ReportTaskReply, SchedulerError> {
        let worker = req.worker_id.as_deref().unwrap_or("-");
        let outcome = self.lock().report(req.task_type, req.seq, req.success)?;

        match outcome {
            ReportOutcome::Completed => {
                info!("{} task {} completed by worker {}", req.task_type, req.seq, worker);
            }
            ReportOutcome::PhaseAdvanced => {
                info!(
                    "{} task {} completed by worker {}; all map tasks done, starting reduce phase",
                    req.task_type, req.seq, worker
                );
            }
            ReportOutcome::AlreadyCompleted => {
                info!(
                    "duplicate completion of {} task {} from worker {}",
                    req.task_type, req.seq, worker
                );
            }
            ReportOutcome::Released => {
                warn!(
                    "worker {} failed {} task {}, making it available again",
                    worker, req.task_type, req.seq
                );
            }
            ReportOutcome::Ignored => {
                debug!(
                    "ignoring report {:?} for {} task {} from worker {}",
                    req.success, req.task_type, req.seq, worker
                );
            }
        }

        if outcome == ReportOutcome::Completed && req.task_type == TaskKind::Reduce && self.done() {
            info!("all reduce tasks done, job complete");
        }
        Ok(ReportTaskReply { received: true })
    }

    pub fn done(&self) -> bool {
        self.lock().is_done()
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.lock().snapshot()
    }

    pub(crate) fn reclaim(&self, kind: TaskKind, seq: usize, attempt: u32) -> bool {
        self.lock().reclaim(kind, seq, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mr_common::TaskStatus;

    fn scheduler(inputs: &[&str], n_reduce: usize, timeout: Duration) -> Scheduler {
        let inputs = inputs.iter().map(|s| s.to_string()).collect();
        Scheduler::new(JobState::new(inputs, n_reduce).unwrap(), timeout)
    }

    fn report(kind: TaskKind, seq: usize, success: bool) -> ReportTaskRequest {
        ReportTaskRequest {
            task_type: kind,
            seq,
            success,
            worker_id: Some("w-test".into()),
        }
    }

    #[tokio::test]
    async fn replies_carry_partition_and_map_counts() {
        let s = scheduler(&["a.txt", "b.txt"], 3, Duration::from_secs(60));

        let reply = s.get_task(Some("w1"));
        assert!(!reply.wait);
        assert_eq!(reply.n_reduce, 3);
        assert_eq!(reply.n_map, 2);
        assert_eq!(reply.task.unwrap().source.as_deref(), Some("a.txt"));
    }

    #[tokio::test]
    async fn unreported_task_is_handed_out_again_after_timeout() {
        let s = scheduler(&["a.txt"], 1, Duration::from_millis(50));

        let first = s.get_task(Some("silent")).task.unwrap();
        assert!(s.get_task(Some("other")).wait);

        tokio::time::sleep(Duration::from_millis(200)).await;

        let again = s.get_task(Some("other")).task.unwrap();
        assert_eq!(again.kind, first.kind);
        assert_eq!(again.seq, first.seq);
        assert_eq!(again.attempt, 2);
    }

    #[tokio::test]
    async fn completed_task_survives_its_timer() {
        let s = scheduler(&["a.txt"], 1, Duration::from_millis(30));

        let t = s.get_task(None).task.unwrap();
        s.report_task(&report(t.kind, t.seq, true)).unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        let snap = s.snapshot();
        assert_eq!(snap.map_tasks[0].status, TaskStatus::Completed);
        assert_eq!(s.get_task(None).task.unwrap().kind, TaskKind::Reduce);
    }

    #[tokio::test]
    async fn failed_task_is_handed_out_without_waiting() {
        let s = scheduler(&["a.txt", "b.txt"], 1, Duration::from_secs(60));

        let t = s.get_task(Some("w1")).task.unwrap();
        s.report_task(&report(TaskKind::Map, t.seq, false)).unwrap();

        let again = s.get_task(Some("w2")).task.unwrap();
        assert_eq!(again.seq, t.seq);
    }

    #[tokio::test]
    async fn full_job_reaches_done() {
        let s = scheduler(&["a.txt", "b.txt"], 2, Duration::from_secs(60));

        while !s.done() {
            let reply = s.get_task(None);
            let task = reply.task.expect("sequential driver never has tasks in flight");
            s.report_task(&report(task.kind, task.seq, true)).unwrap();
        }

        assert!(s.get_task(None).wait);
        assert_eq!(s.snapshot().reduce_counts.completed, 2);
    }

    #[tokio::test]
    async fn unknown_task_report_is_rejected() {
        let s = scheduler(&["a.txt"], 1, Duration::from_secs(60));
        assert!(s.report_task(&report(TaskKind::Map, 3, true)).is_err());
    }
}
