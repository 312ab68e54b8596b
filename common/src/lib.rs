pub mod app;
pub mod env;
pub mod files;
pub mod indexer;
pub mod kv;
pub mod messages;
pub mod sequential;
pub mod task;
pub mod wordcount;

pub use app::{app_by_name, FnApp, MapReduceApp, BUILTIN_APPS};
pub use kv::KeyValue;
pub use messages::{
    DoneReply, GetTaskReply, GetTaskRequest, JobPhase, JobSnapshot, ReportTaskReply,
    ReportTaskRequest, StatusCounts, WorkerId,
};
pub use task::{Task, TaskKind, TaskStatus};
