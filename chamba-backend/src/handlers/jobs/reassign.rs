use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::handlers::utils::path_uuid;
use crate::{error::ApiError, state::AppState};

pub async fn reassign(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let job_id = path_uuid(&path, "jobId")?;
    let payload = body
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0;
    let worker_raw: String = serde_json::from_value(
        payload
            .get("workerId")
            .cloned()
            .ok_or_else(|| ApiError::bad_request("missing workerId"))?,
    )
    .map_err(ApiError::from)?;
    let new_worker_id =
        Uuid::parse_str(&worker_raw).map_err(|_| ApiError::bad_request("invalid workerId"))?;

    state.workflow.reassign_job(job_id, new_worker_id).await?;
    Ok(Json(json!({ "status": "reassigned" })))
}
