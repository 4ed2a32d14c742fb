use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};

use crate::handlers::utils::path_uuid;
use crate::{error::ApiError, state::AppState};

pub async fn release(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let job_id = path_uuid(&path, "jobId")?;
    state.workflow.release_payment(job_id).await?;
    Ok(Json(json!({ "status": "released" })))
}
