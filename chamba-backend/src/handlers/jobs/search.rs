use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Query};
use serde_json::Value;

use chamba_core::GeoPoint;

use crate::handlers::jobs::dto::JobResponse;
use crate::handlers::utils::page_from_query;
use crate::{error::ApiError, state::AppState};

fn required_f64(query: &HashMap<String, String>, key: &str) -> Result<f64, ApiError> {
    query
        .get(key)
        .ok_or_else(|| ApiError::bad_request(format!("missing {key} query parameter")))?
        .parse::<f64>()
        .map_err(|_| ApiError::bad_request(format!("invalid {key}")))
}

/// Geo-cap search: `tags` is a comma-separated list, `lon`/`lat` the center
/// of the cap and `radius` its size in meters.
pub async fn search(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let tags: Vec<String> = query
        .get("tags")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let lon = required_f64(&query, "lon")?;
    let lat = required_f64(&query, "lat")?;
    let radius_m = required_f64(&query, "radius")?;
    let page = page_from_query(&query, &state.pagination)?;

    let jobs = state
        .workflow
        .find_jobs(&tags, GeoPoint::new(lon, lat), radius_m, page)
        .await?;
    let responses: Vec<JobResponse> = jobs.into_iter().map(Into::into).collect();
    Ok(Json(serde_json::to_value(&responses)?))
}
