use mr_common::TaskKind;
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, warn};

use crate::scheduler::Scheduler;

/// Crash detector for one assignment.
///
/// Sleeps for the task timeout, then reclaims the task if it is still held
/// under the same attempt. The original holder is not told; if it is only
/// slow it may still finish and report, and that report is accepted.
pub fn spawn_crash_detector(
    scheduler: Scheduler,
    kind: TaskKind,
    seq: usize,
    attempt: u32,
) -> JoinHandle<()> {
    let timeout = scheduler.task_timeout();

    tokio::spawn(async move {
        sleep(timeout).await;

        if scheduler.reclaim(kind, seq, attempt) {
            warn!(
                "{} task {} (attempt {}) not reported after {:?}, making it available again",
                kind, seq, attempt, timeout
            );
        } else {
            debug!("{} task {} (attempt {}) settled in time", kind, seq, attempt);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::JobState;
    use mr_common::TaskStatus;
    use std::time::Duration;

    #[tokio::test]
    async fn detector_reclaims_matching_assignment() {
        let scheduler = Scheduler::new(
            JobState::new(vec!["a.txt".into()], 1).unwrap(),
            Duration::from_millis(20),
        );
        // get_task already started one detector; a second for the same
        // attempt must be harmless
        let t = scheduler.get_task(None).task.unwrap();
        spawn_crash_detector(scheduler.clone(), t.kind, t.seq, t.attempt)
            .await
            .unwrap();

        assert_eq!(scheduler.snapshot().map_tasks[0].status, TaskStatus::Available);
    }

    #[tokio::test]
    async fn detector_leaves_completed_task_alone() {
        let scheduler = Scheduler::new(
            JobState::new(vec!["a.txt".into()], 1).unwrap(),
            Duration::from_millis(20),
        );
        let t = scheduler.get_task(None).task.unwrap();
        scheduler
            .report_task(&mr_common::ReportTaskRequest {
                task_type: t.kind,
                seq: t.seq,
                success: true,
                worker_id: None,
            })
            .unwrap();

        spawn_crash_detector(scheduler.clone(), t.kind, t.seq, t.attempt)
            .await
            .unwrap();

        assert_eq!(scheduler.snapshot().map_tasks[0].status, TaskStatus::Completed);
    }
}
