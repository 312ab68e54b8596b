use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mr_common::{
    DoneReply, GetTaskReply, GetTaskRequest, JobSnapshot, ReportTaskReply, ReportTaskRequest,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::SchedulerError;
use crate::scheduler::Scheduler;

pub fn build_router(scheduler: Scheduler) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/tasks/next", post(get_task))
        .route("/api/v1/tasks/report", post(report_task))
        .route("/api/v1/job", get(job_snapshot))
        .route("/api/v1/job/done", get(job_done))
        .layer(TraceLayer::new_for_http())
        .with_state(scheduler)
}

impl IntoResponse for SchedulerError {
    fn into_response(self) -> Response {
        let status = match self {
            SchedulerError::UnknownTask { .. } => StatusCode::NOT_FOUND,
            SchedulerError::InvalidPartitionCount => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/* ---------------- HTTP handlers ---------------- */

async fn health() -> &'static str {
    "ok"
}

async fn get_task(
    State(scheduler): State<Scheduler>,
    Json(req): Json<GetTaskRequest>,
) -> Json<GetTaskReply> {
    Json(scheduler.get_task(req.worker_id.as_deref()))
}

async fn report_task(
    State(scheduler): State<Scheduler>,
    Json(req): Json<ReportTaskRequest>,
) -> Result<Json<ReportTaskReply>, SchedulerError> {
    scheduler.report_task(&req).map(Json)
}

async fn job_done(State(scheduler): State<Scheduler>) -> Json<DoneReply> {
    Json(DoneReply {
        done: scheduler.done(),
    })
}

async fn job_snapshot(State(scheduler): State<Scheduler>) -> Json<JobSnapshot> {
    Json(scheduler.snapshot())
}
