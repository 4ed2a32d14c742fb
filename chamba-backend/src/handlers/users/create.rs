use std::sync::Arc;

use axum::extract::{Extension, Json};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use chamba_db::users::{self, UsersRow};

use crate::handlers::users::dto::{CreateUserDto, UserResponse};
use crate::{error::ApiError, state::AppState};

pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let payload = body
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0;
    let dto: CreateUserDto = serde_json::from_value(payload).map_err(ApiError::from)?;
    dto.validate()
        .map_err(|issues| ApiError::Validation(crate::validation::to_payload(&issues)))?;

    let now = Utc::now().to_rfc3339();
    let row = UsersRow {
        id: Uuid::new_v4(),
        display_name: dto.display_name,
        banned: 0,
        prime_until: None,
        completed_jobs: 0,
        created_at: now.clone(),
        updated_at: now,
    };

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    users::insert_user(&mut *conn, &row)
        .await
        .map_err(ApiError::from)?;
    tracing::info!(user_id = %row.id, "user created");

    let response: UserResponse = row.into();
    Ok(Json(serde_json::to_value(&response)?))
}
