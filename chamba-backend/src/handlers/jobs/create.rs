use std::sync::Arc;

use axum::extract::{Extension, Json};
use serde_json::Value;
use uuid::Uuid;

use chamba_core::NewJob;

use crate::handlers::jobs::dto::{CreateJobDto, JobResponse};
use crate::{error::ApiError, state::AppState};

pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let payload = body
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0;
    let dto: CreateJobDto = serde_json::from_value(payload).map_err(ApiError::from)?;

    let employer_id = Uuid::parse_str(&dto.employer_id)
        .map_err(|_| ApiError::bad_request("invalid employerId"))?;

    let job = state
        .workflow
        .create_job(NewJob {
            employer_id,
            title: dto.title,
            description: dto.description,
            tags: dto.tags,
            location: dto.location,
            budget: dto.budget,
        })
        .await?;

    let response: JobResponse = job.into();
    Ok(Json(serde_json::to_value(&response)?))
}
