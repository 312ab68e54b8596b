use mr_common::TaskKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("unknown {kind} task {seq} (job has {len})")]
    UnknownTask {
        kind: TaskKind,
        seq: usize,
        len: usize,
    },

    #[error("partition count must be at least 1")]
    InvalidPartitionCount,
}
