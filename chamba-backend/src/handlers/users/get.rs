use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::Value;

use chamba_db::users;

use crate::handlers::users::dto::UserResponse;
use crate::handlers::utils::path_uuid;
use crate::{error::ApiError, state::AppState};

pub async fn get_by_id(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let user_id = path_uuid(&path, "userId")?;
    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let opt = users::find_by_primary_key(&mut *conn, &user_id)
        .await
        .map_err(ApiError::from)?;
    match opt {
        Some(row) => {
            let response: UserResponse = row.into();
            Ok(Json(serde_json::to_value(&response)?))
        }
        None => Err(ApiError::not_found("user not found")),
    }
}
