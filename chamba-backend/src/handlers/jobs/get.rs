use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::Value;

use crate::handlers::jobs::dto::JobResponse;
use crate::handlers::utils::path_uuid;
use crate::{error::ApiError, state::AppState};

pub async fn get_by_id(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let job_id = path_uuid(&path, "jobId")?;
    let job = state.workflow.get_job(job_id).await?;
    let response: JobResponse = job.into();
    Ok(Json(serde_json::to_value(&response)?))
}
