use std::collections::HashMap;

use uuid::Uuid;

use chamba_config::PaginationConfig;
use chamba_core::PageRequest;

use crate::error::ApiError;

/// Pull a UUID out of the path parameter map.
pub fn path_uuid(path: &HashMap<String, String>, key: &str) -> Result<Uuid, ApiError> {
    let raw = path
        .get(key)
        .ok_or_else(|| ApiError::bad_request(format!("missing {key} path parameter")))?;
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("invalid {key}")))
}

/// Build a page request from `page`/`pageSize` query parameters, clamping the
/// page size to the configured maximum.
pub fn page_from_query(
    query: &HashMap<String, String>,
    pagination: &PaginationConfig,
) -> Result<PageRequest, ApiError> {
    let page = match query.get("page") {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ApiError::bad_request("invalid page"))?,
        None => 1,
    };
    let page_size = match query.get("pageSize") {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ApiError::bad_request("invalid pageSize"))?,
        None => pagination.default_page_size,
    };
    if page_size == 0 {
        return Err(ApiError::bad_request("pageSize must be at least 1"));
    }
    Ok(PageRequest::new(
        page,
        page_size.min(pagination.max_page_size),
    ))
}
