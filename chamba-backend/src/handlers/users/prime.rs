use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use chrono::Utc;
use serde_json::{json, Value};

use chamba_db::users;

use crate::handlers::utils::path_uuid;
use crate::{error::ApiError, state::AppState};

/// Set the end of the Prime subscription window, or clear it with `null`.
pub async fn prime(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let user_id = path_uuid(&path, "userId")?;
    let payload = body
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0;
    let prime_until: Option<String> = match payload.get("primeUntil").cloned() {
        Some(Value::Null) | None => None,
        Some(v) => {
            let raw: String = serde_json::from_value(v).map_err(ApiError::from)?;
            chrono::DateTime::parse_from_rfc3339(&raw)
                .map_err(|_| ApiError::bad_request("primeUntil must be an RFC 3339 timestamp"))?;
            Some(raw)
        }
    };

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let matched = users::set_prime_until(
        &mut *conn,
        &user_id,
        prime_until.as_deref(),
        &Utc::now().to_rfc3339(),
    )
    .await
    .map_err(ApiError::from)?;
    if matched == 0 {
        return Err(ApiError::not_found("user not found"));
    }
    tracing::info!(user_id = %user_id, "prime window updated");
    Ok(Json(json!({ "status": "updated" })))
}
