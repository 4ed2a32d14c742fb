use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use chrono::Utc;
use serde_json::{json, Value};

use chamba_db::users;

use crate::handlers::utils::path_uuid;
use crate::{error::ApiError, state::AppState};

/// Set or clear the ban flag. Banned employers cannot post new jobs.
pub async fn ban(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let user_id = path_uuid(&path, "userId")?;
    let payload = body
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0;
    let banned: bool = serde_json::from_value(
        payload
            .get("banned")
            .cloned()
            .ok_or_else(|| ApiError::bad_request("missing banned"))?,
    )
    .map_err(ApiError::from)?;

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let matched = users::set_banned(&mut *conn, &user_id, banned, &Utc::now().to_rfc3339())
        .await
        .map_err(ApiError::from)?;
    if matched == 0 {
        return Err(ApiError::not_found("user not found"));
    }
    tracing::info!(user_id = %user_id, banned, "ban flag updated");
    Ok(Json(json!({ "status": "updated" })))
}
