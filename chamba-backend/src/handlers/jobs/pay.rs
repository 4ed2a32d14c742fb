use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};

use crate::handlers::utils::path_uuid;
use crate::{error::ApiError, state::AppState};

pub async fn pay(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let job_id = path_uuid(&path, "jobId")?;
    let payload = body
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0;
    let amount: f64 = serde_json::from_value(
        payload
            .get("amount")
            .cloned()
            .ok_or_else(|| ApiError::bad_request("missing amount"))?,
    )
    .map_err(ApiError::from)?;
    if !(amount > 0.0) {
        return Err(ApiError::bad_request("amount must be greater than zero"));
    }

    state.workflow.register_payment(job_id, amount).await?;
    Ok(Json(json!({ "status": "paid" })))
}
