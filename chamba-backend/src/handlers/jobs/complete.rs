use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::handlers::utils::path_uuid;
use crate::{error::ApiError, state::AppState};

/// Completion is employer-only: the requester id must match the job's
/// employer for the status flip to go through.
pub async fn complete(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let job_id = path_uuid(&path, "jobId")?;
    let payload = body
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0;
    let requester_raw: String = serde_json::from_value(
        payload
            .get("requesterId")
            .cloned()
            .ok_or_else(|| ApiError::bad_request("missing requesterId"))?,
    )
    .map_err(ApiError::from)?;
    let requester_id = Uuid::parse_str(&requester_raw)
        .map_err(|_| ApiError::bad_request("invalid requesterId"))?;

    state.workflow.complete_job(job_id, requester_id).await?;
    Ok(Json(json!({ "status": "completed" })))
}
