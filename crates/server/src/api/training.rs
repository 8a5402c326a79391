//! Training job API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use calaxis_core::{ErrorPayload, JobSnapshot};
use std::sync::Arc;

use crate::state::AppState;

/// Create a new training job in the `QUEUED` state
pub async fn start_training(State(state): State<Arc<AppState>>) -> Json<JobSnapshot> {
    Json(state.registry().create())
}

/// Get the current state of a training job
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobSnapshot>, (StatusCode, Json<ErrorPayload>)> {
    state.registry().get(&job_id).map(Json).map_err(|e| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorPayload::new(e.payload_message(), job_id)),
        )
    })
}
