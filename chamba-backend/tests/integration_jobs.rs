use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde_json::{json, Value};

use chamba_config::PaginationConfig;
use chamba_db::{create_pool, DbConnectionConfig};

use chamba_backend::error::ApiError;
use chamba_backend::handlers;
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

async fn create_user(state: &Arc<AppState>, display_name: &str) -> String {
    let res = handlers::users::create::create(
        Extension(state.clone()),
        Some(Json(json!({ "displayName": display_name }))),
    )
    .await
    .expect("create user");
    res.0
        .get("id")
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string()
}

async fn get_user(state: &Arc<AppState>, id: &str) -> Value {
    let mut path = HashMap::new();
    path.insert("userId".to_string(), id.to_string());
    handlers::users::get::get_by_id(Extension(state.clone()), Path(path))
        .await
        .expect("get user")
        .0
}

async fn create_job(state: &Arc<AppState>, employer_id: &str) -> String {
    let body = json!({
        "employerId": employer_id,
        "title": "Mount a TV bracket",
        "description": "55 inch TV onto a plaster wall, bracket provided.",
        "tags": ["handyman", "mounting"],
        "location": { "lon": -99.13, "lat": 19.43 },
        "budget": 45.0
    });
    let res = handlers::jobs::create::create(Extension(state.clone()), Some(Json(body)))
        .await
        .expect("create job");
    res.0
        .get("id")
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string()
}

fn job_path(id: &str) -> Path<HashMap<String, String>> {
    let mut path = HashMap::new();
    path.insert("jobId".to_string(), id.to_string());
    Path(path)
}

#[tokio::test]
async fn full_job_lifecycle_sqlite_in_memory() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;
    let worker = create_user(&state, "worker").await;

    let job_id = create_job(&state, &employer).await;

    // apply
    handlers::jobs::apply::apply(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({
            "applicantId": worker,
            "proposal": "Can come tomorrow morning",
            "proposedPrice": 40.0
        }))),
    )
    .await
    .expect("apply");

    // assign
    handlers::jobs::assign::assign(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "workerId": worker }))),
    )
    .await
    .expect("assign");

    let job = handlers::jobs::get::get_by_id(Extension(state.clone()), job_path(&job_id))
        .await
        .expect("get job")
        .0;
    assert_eq!(job.get("status").and_then(|v| v.as_str()), Some("in_progress"));
    assert_eq!(
        job.get("assignedWorkerId").and_then(|v| v.as_str()),
        Some(worker.as_str())
    );
    assert_eq!(
        job.get("applicants")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(1)
    );

    // both feedback slots
    handlers::jobs::feedback::feedback(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(
            json!({ "role": "employer", "comment": "great work", "rating": 5 }),
        )),
    )
    .await
    .expect("employer feedback");
    handlers::jobs::feedback::feedback(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(
            json!({ "role": "worker", "comment": "smooth job", "rating": 4 }),
        )),
    )
    .await
    .expect("worker feedback");

    // complete, pay, release
    handlers::jobs::complete::complete(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "requesterId": employer }))),
    )
    .await
    .expect("complete");
    handlers::jobs::pay::pay(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "amount": 45.0 }))),
    )
    .await
    .expect("pay");
    handlers::jobs::release::release(Extension(state.clone()), job_path(&job_id))
        .await
        .expect("release");

    let job = handlers::jobs::get::get_by_id(Extension(state.clone()), job_path(&job_id))
        .await
        .expect("get job")
        .0;
    assert_eq!(job.get("status").and_then(|v| v.as_str()), Some("completed"));
    assert_eq!(
        job.get("paymentStatus").and_then(|v| v.as_str()),
        Some("released")
    );
    assert_eq!(job.get("paymentAmount").and_then(|v| v.as_f64()), Some(45.0));
    assert_eq!(
        job.get("employerFeedback")
            .and_then(|f| f.get("rating"))
            .and_then(|v| v.as_u64()),
        Some(5)
    );

    // both parties credited exactly once
    let employer_row = get_user(&state, &employer).await;
    let worker_row = get_user(&state, &worker).await;
    assert_eq!(
        employer_row.get("completedJobs").and_then(|v| v.as_i64()),
        Some(1)
    );
    assert_eq!(
        worker_row.get("completedJobs").and_then(|v| v.as_i64()),
        Some(1)
    );
}

#[tokio::test]
async fn banned_employer_cannot_post() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;

    let mut path = HashMap::new();
    path.insert("userId".to_string(), employer.clone());
    handlers::users::ban::ban(
        Extension(state.clone()),
        Path(path),
        Some(Json(json!({ "banned": true }))),
    )
    .await
    .expect("ban");

    let body = json!({
        "employerId": employer,
        "title": "Mount a TV bracket",
        "description": "55 inch TV onto a plaster wall, bracket provided.",
        "tags": ["handyman"],
        "location": { "lon": 0.0, "lat": 0.0 },
        "budget": 45.0
    });
    let err = handlers::jobs::create::create(Extension(state.clone()), Some(Json(body)))
        .await
        .expect_err("banned employer must be rejected");
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn create_job_collects_validation_issues() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;

    let body = json!({
        "employerId": employer,
        "title": "ab",
        "description": "too short",
        "tags": [],
        "location": { "lon": 200.0, "lat": 0.0 },
        "budget": 0.0
    });
    let err = handlers::jobs::create::create(Extension(state.clone()), Some(Json(body)))
        .await
        .expect_err("invalid job must be rejected");
    match err {
        ApiError::Validation(payload) => {
            let fields = payload
                .get("validation")
                .and_then(|v| v.as_object())
                .expect("validation map");
            for field in ["title", "description", "tags", "budget", "location"] {
                assert!(fields.contains_key(field), "missing issue for {field}");
            }
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn second_completion_conflicts_and_counters_stay() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;
    let worker = create_user(&state, "worker").await;
    let job_id = create_job(&state, &employer).await;

    handlers::jobs::assign::assign(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "workerId": worker }))),
    )
    .await
    .expect("assign");

    handlers::jobs::complete::complete(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "requesterId": employer }))),
    )
    .await
    .expect("first completion");

    let err = handlers::jobs::complete::complete(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "requesterId": employer }))),
    )
    .await
    .expect_err("second completion must conflict");
    assert!(matches!(err, ApiError::Conflict(_)));

    let worker_row = get_user(&state, &worker).await;
    assert_eq!(
        worker_row.get("completedJobs").and_then(|v| v.as_i64()),
        Some(1)
    );
}

#[tokio::test]
async fn completion_by_non_owner_reads_as_missing() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;
    let stranger = create_user(&state, "stranger").await;
    let job_id = create_job(&state, &employer).await;

    let err = handlers::jobs::complete::complete(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "requesterId": stranger }))),
    )
    .await
    .expect_err("non-owner completion must fail");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn free_tier_cap_blocks_until_prime() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;
    let worker = create_user(&state, "veteran").await;
    let job_id = create_job(&state, &employer).await;

    // Fast-forward the worker past the free-tier limit.
    let worker_id = worker.parse().expect("uuid");
    let mut conn = state.db_pool.acquire().await.expect("acquire");
    for _ in 0..2 {
        chamba_db::users::increment_completed_jobs(
            &mut *conn,
            &worker_id,
            &chrono::Utc::now().to_rfc3339(),
        )
        .await
        .expect("bump counter");
    }
    drop(conn);

    let err = handlers::jobs::apply::apply(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "applicantId": worker }))),
    )
    .await
    .expect_err("capped worker must be rejected");
    assert!(matches!(err, ApiError::Forbidden(_)));

    // An active Prime window lifts the cap.
    let mut path = HashMap::new();
    path.insert("userId".to_string(), worker.clone());
    let until = (chrono::Utc::now() + chrono::Duration::days(30)).to_rfc3339();
    handlers::users::prime::prime(
        Extension(state.clone()),
        Path(path),
        Some(Json(json!({ "primeUntil": until }))),
    )
    .await
    .expect("set prime");

    handlers::jobs::apply::apply(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "applicantId": worker }))),
    )
    .await
    .expect("prime worker applies");
}

#[tokio::test]
async fn employer_cannot_apply_to_own_job() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;
    let job_id = create_job(&state, &employer).await;

    let err = handlers::jobs::apply::apply(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "applicantId": employer }))),
    )
    .await
    .expect_err("self-application must be rejected");
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn reapplying_keeps_a_single_entry() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;
    let worker = create_user(&state, "worker").await;
    let job_id = create_job(&state, &employer).await;

    for _ in 0..3 {
        handlers::jobs::apply::apply(
            Extension(state.clone()),
            job_path(&job_id),
            Some(Json(json!({ "applicantId": worker }))),
        )
        .await
        .expect("apply");
    }

    let job = handlers::jobs::get::get_by_id(Extension(state.clone()), job_path(&job_id))
        .await
        .expect("get job")
        .0;
    assert_eq!(
        job.get("applicants")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(1)
    );
}

#[tokio::test]
async fn payment_chain_is_monotonic() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;
    let job_id = create_job(&state, &employer).await;

    // release before pay
    let err = handlers::jobs::release::release(Extension(state.clone()), job_path(&job_id))
        .await
        .expect_err("release before payment must conflict");
    assert!(matches!(err, ApiError::Conflict(_)));

    handlers::jobs::pay::pay(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "amount": 45.0 }))),
    )
    .await
    .expect("pay");

    // double pay
    let err = handlers::jobs::pay::pay(
        Extension(state.clone()),
        job_path(&job_id),
        Some(Json(json!({ "amount": 45.0 }))),
    )
    .await
    .expect_err("second payment must conflict");
    assert!(matches!(err, ApiError::Conflict(_)));

    handlers::jobs::release::release(Extension(state.clone()), job_path(&job_id))
        .await
        .expect("release");

    // double release
    let err = handlers::jobs::release::release(Extension(state.clone()), job_path(&job_id))
        .await
        .expect_err("second release must conflict");
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn search_filters_by_tag_and_radius() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;

    let near = json!({
        "employerId": employer,
        "title": "Fix the kitchen tap",
        "description": "Dripping tap, spare cartridge available.",
        "tags": ["plumbing"],
        "location": { "lon": -99.13, "lat": 19.43 },
        "budget": 30.0
    });
    let far = json!({
        "employerId": employer,
        "title": "Fix the bathroom tap",
        "description": "Dripping tap on the first floor bathroom.",
        "tags": ["plumbing"],
        "location": { "lon": -98.2, "lat": 19.0 },
        "budget": 30.0
    });
    let other_trade = json!({
        "employerId": employer,
        "title": "Paint the hallway",
        "description": "Two coats of white over existing paint.",
        "tags": ["painting"],
        "location": { "lon": -99.131, "lat": 19.431 },
        "budget": 120.0
    });
    for body in [near, far, other_trade] {
        handlers::jobs::create::create(Extension(state.clone()), Some(Json(body)))
            .await
            .expect("create job");
    }

    let mut query = HashMap::new();
    query.insert("tags".to_string(), "plumbing,electrical".to_string());
    query.insert("lon".to_string(), "-99.13".to_string());
    query.insert("lat".to_string(), "19.43".to_string());
    query.insert("radius".to_string(), "5000".to_string());

    let res = handlers::jobs::search::search(Extension(state.clone()), Query(query))
        .await
        .expect("search");
    let jobs = res.0.as_array().expect("array").clone();
    assert_eq!(jobs.len(), 1);
    assert_eq!(
        jobs[0].get("title").and_then(|v| v.as_str()),
        Some("Fix the kitchen tap")
    );
}

#[tokio::test]
async fn employer_listing_pages_through_jobs() {
    let state = test_state().await;
    let employer = create_user(&state, "employer").await;
    for _ in 0..3 {
        create_job(&state, &employer).await;
    }

    let mut query = HashMap::new();
    query.insert("employerId".to_string(), employer.clone());
    query.insert("page".to_string(), "1".to_string());
    query.insert("pageSize".to_string(), "2".to_string());
    let res = handlers::jobs::list::list(Extension(state.clone()), Query(query))
        .await
        .expect("list");
    assert_eq!(res.0.as_array().map(|a| a.len()), Some(2));

    let mut query = HashMap::new();
    query.insert("employerId".to_string(), employer.clone());
    query.insert("page".to_string(), "2".to_string());
    query.insert("pageSize".to_string(), "2".to_string());
    let res = handlers::jobs::list::list(Extension(state.clone()), Query(query))
        .await
        .expect("list");
    assert_eq!(res.0.as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let state = test_state().await;
    let err = handlers::jobs::get::get_by_id(
        Extension(state.clone()),
        job_path("00000000-0000-0000-0000-000000000001"),
    )
    .await
    .expect_err("missing job");
    assert!(matches!(err, ApiError::NotFound(_)));
}
