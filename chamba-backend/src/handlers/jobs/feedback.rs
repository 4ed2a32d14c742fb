use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};

use chamba_core::FeedbackRole;

use crate::handlers::jobs::dto::FeedbackDto;
use crate::handlers::utils::path_uuid;
use crate::{error::ApiError, state::AppState};

pub async fn feedback(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let job_id = path_uuid(&path, "jobId")?;
    let payload = body
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0;
    let dto: FeedbackDto = serde_json::from_value(payload).map_err(ApiError::from)?;
    let role = match dto.role.as_str() {
        "employer" => FeedbackRole::Employer,
        "worker" => FeedbackRole::Worker,
        _ => return Err(ApiError::bad_request("role must be employer or worker")),
    };

    state
        .workflow
        .provide_feedback(job_id, role, dto.comment, dto.rating)
        .await?;
    Ok(Json(json!({ "status": "feedback recorded" })))
}
