use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::handlers::jobs::dto::ApplyDto;
use crate::handlers::utils::path_uuid;
use crate::{error::ApiError, state::AppState};

pub async fn apply(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let job_id = path_uuid(&path, "jobId")?;
    let payload = body
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0;
    let dto: ApplyDto = serde_json::from_value(payload).map_err(ApiError::from)?;
    let applicant_id = Uuid::parse_str(&dto.applicant_id)
        .map_err(|_| ApiError::bad_request("invalid applicantId"))?;

    state
        .workflow
        .apply_to_job(job_id, applicant_id, dto.proposal, dto.proposed_price)
        .await?;
    Ok(Json(json!({ "status": "applied" })))
}
