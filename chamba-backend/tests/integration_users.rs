use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::json;

use chamba_config::PaginationConfig;
use chamba_db::{create_pool, DbConnectionConfig};

use chamba_backend::error::ApiError;
use chamba_backend::handlers::users;
use chamba_backend::state::AppState;

async fn test_state() -> Arc<AppState> {
    let config = DbConnectionConfig::new("sqlite::memory:");
    let pool = create_pool(&config).await.expect("create pool");
    chamba_migrations::sqlite_migrator()
        .run(&pool)
        .await
        .expect("migrations");
    Arc::new(AppState::new(
        pool,
        PaginationConfig {
            default_page_size: 20,
            max_page_size: 100,
        },
    ))
}

fn user_path(id: &str) -> Path<HashMap<String, String>> {
    let mut path = HashMap::new();
    path.insert("userId".to_string(), id.to_string());
    Path(path)
}

#[tokio::test]
async fn users_crud_sqlite_in_memory() {
    let state = test_state().await;

    let created = users::create::create(
        Extension(state.clone()),
        Some(Json(json!({ "displayName": "maria" }))),
    )
    .await
    .expect("create")
    .0;
    let id = created
        .get("id")
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string();
    assert_eq!(created.get("banned").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        created.get("completedJobs").and_then(|v| v.as_i64()),
        Some(0)
    );

    users::ban::ban(
        Extension(state.clone()),
        user_path(&id),
        Some(Json(json!({ "banned": true }))),
    )
    .await
    .expect("ban");

    let until = (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339();
    users::prime::prime(
        Extension(state.clone()),
        user_path(&id),
        Some(Json(json!({ "primeUntil": until }))),
    )
    .await
    .expect("prime");

    let got = users::get::get_by_id(Extension(state.clone()), user_path(&id))
        .await
        .expect("get")
        .0;
    assert_eq!(got.get("banned").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        got.get("primeUntil").and_then(|v| v.as_str()),
        Some(until.as_str())
    );

    // clearing the window
    users::prime::prime(
        Extension(state.clone()),
        user_path(&id),
        Some(Json(json!({ "primeUntil": null }))),
    )
    .await
    .expect("clear prime");
    let got = users::get::get_by_id(Extension(state.clone()), user_path(&id))
        .await
        .expect("get")
        .0;
    assert!(got.get("primeUntil").is_none());
}

#[tokio::test]
async fn blank_display_name_is_rejected() {
    let state = test_state().await;
    let err = users::create::create(
        Extension(state.clone()),
        Some(Json(json!({ "displayName": "   " }))),
    )
    .await
    .expect_err("blank name");
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn malformed_prime_timestamp_is_rejected() {
    let state = test_state().await;
    let created = users::create::create(
        Extension(state.clone()),
        Some(Json(json!({ "displayName": "jorge" }))),
    )
    .await
    .expect("create")
    .0;
    let id = created.get("id").and_then(|v| v.as_str()).expect("id");

    let err = users::prime::prime(
        Extension(state.clone()),
        user_path(id),
        Some(Json(json!({ "primeUntil": "next tuesday" }))),
    )
    .await
    .expect_err("bad timestamp");
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn operations_on_missing_users_are_not_found() {
    let state = test_state().await;
    let ghost = "00000000-0000-0000-0000-000000000009";

    let err = users::get::get_by_id(Extension(state.clone()), user_path(ghost))
        .await
        .expect_err("missing user");
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = users::ban::ban(
        Extension(state.clone()),
        user_path(ghost),
        Some(Json(json!({ "banned": true }))),
    )
    .await
    .expect_err("missing user");
    assert!(matches!(err, ApiError::NotFound(_)));
}
