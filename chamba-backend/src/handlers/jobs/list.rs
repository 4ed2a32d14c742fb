use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Query};
use serde_json::Value;
use uuid::Uuid;

use crate::handlers::jobs::dto::JobResponse;
use crate::handlers::utils::page_from_query;
use crate::{error::ApiError, state::AppState};

/// List the jobs posted by one employer, paged in creation order.
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let employer_raw = query
        .get("employerId")
        .ok_or_else(|| ApiError::bad_request("missing employerId query parameter"))?;
    let employer_id = Uuid::parse_str(employer_raw)
        .map_err(|_| ApiError::bad_request("invalid employerId"))?;
    let page = page_from_query(&query, &state.pagination)?;

    let jobs = state
        .workflow
        .list_jobs_by_employer(employer_id, page)
        .await?;
    let responses: Vec<JobResponse> = jobs.into_iter().map(Into::into).collect();
    Ok(Json(serde_json::to_value(&responses)?))
}
