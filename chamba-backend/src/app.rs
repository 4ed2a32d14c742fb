use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    extract::Extension,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::{handlers, state::AppState};

// Default body limit: 1 MB is plenty for job postings and feedback.
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Build the primary axum router with the provided shared application state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/jobs", post(handlers::jobs::create::create))
        .route("/jobs", get(handlers::jobs::list::list))
        .route("/jobs/search", get(handlers::jobs::search::search))
        .route("/jobs/{jobId}", get(handlers::jobs::get::get_by_id))
        .route("/jobs/{jobId}/apply", post(handlers::jobs::apply::apply))
        .route("/jobs/{jobId}/assign", post(handlers::jobs::assign::assign))
        .route(
            "/jobs/{jobId}/reassign",
            post(handlers::jobs::reassign::reassign),
        )
        .route(
            "/jobs/{jobId}/feedback",
            post(handlers::jobs::feedback::feedback),
        )
        .route(
            "/jobs/{jobId}/complete",
            post(handlers::jobs::complete::complete),
        )
        .route("/jobs/{jobId}/payment", post(handlers::jobs::pay::pay))
        .route(
            "/jobs/{jobId}/payment/release",
            post(handlers::jobs::release::release),
        )
        .route("/users", post(handlers::users::create::create))
        .route("/users/{userId}", get(handlers::users::get::get_by_id))
        .route("/users/{userId}/ban", post(handlers::users::ban::ban))
        .route("/users/{userId}/prime", post(handlers::users::prime::prime));

    // health and readiness endpoints
    let router = router
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler));

    router
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(Extension(state))
}

async fn health_handler() -> impl IntoResponse {
    // Liveness: always return 200 OK when the process is alive.
    (axum::http::StatusCode::OK, "OK")
}

async fn ready_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    // Readiness: the process is up and can reach its database.
    match state.db_pool.acquire().await {
        Ok(_) => (axum::http::StatusCode::OK, "OK"),
        Err(_) => (axum::http::StatusCode::SERVICE_UNAVAILABLE, "database unavailable"),
    }
}
