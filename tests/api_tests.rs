use std::net::{IpAddr, Ipv4Addr};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use hanyu_backend_rust::config::Config;
use hanyu_backend_rust::routes::build_router;
use hanyu_backend_rust::state::AppState;

mod common;

/// App with an admin secret but no store, built from an explicit config so
/// the test does not race other tests over process environment variables.
fn app_with_admin_secret(secret: &str) -> axum::Router {
    let config = Config {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        log_level: "info".to_string(),
        telegram_bot_token: None,
        admin_secret: Some(secret.to_string()),
    };
    build_router(AppState::new(config, None))
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_as_user(uri: &str, user_id: i64) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-telegram-user-id", user_id.to_string())
        .body(Body::empty())
        .unwrap()
}

fn post_as_user(uri: &str, user_id: i64, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-telegram-user-id", user_id.to_string())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_ok_without_database() {
    let app = common::create_test_app().await;

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"]["configured"], false);
}

#[tokio::test]
async fn vocabulary_serves_fallback_without_database() {
    let app = common::create_test_app().await;

    let response = app.oneshot(get("/api/vocabulary")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 8);
    assert!(entries.iter().all(|e| e["chinese"].is_string()));
}

#[tokio::test]
async fn random_word_comes_from_fallback() {
    let app = common::create_test_app().await;

    let response = app.oneshot(get("/api/vocabulary/random")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["chinese"].is_string());
    assert!(body["pinyin"].is_string());
}

#[tokio::test]
async fn lessons_degrade_to_empty_list() {
    let app = common::create_test_app().await;

    let response = app.oneshot(get("/api/lessons")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn single_lesson_is_absent_without_database() {
    let app = common::create_test_app().await;

    let response = app.oneshot(get("/api/lessons/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn lesson_dialogues_degrade_to_empty_list() {
    let app = common::create_test_app().await;

    let response = app.oneshot(get("/api/lessons/1/dialogues")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn quiz_reports_exhaustion_on_empty_pool() {
    let app = common::create_test_app().await;

    let response = app.oneshot(get("/api/quiz?level=HSK1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["error"].as_str().unwrap().contains("pool size 0"));
}

#[tokio::test]
async fn progress_reads_require_identity() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(get("/api/user-progress/lessons"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn progress_list_degrades_to_empty_for_identified_user() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(get_as_user("/api/user-progress/lessons", 42))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn single_lesson_progress_reads_as_null() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(get_as_user("/api/user-progress/lessons/7", 42))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, Value::Null);
}

#[tokio::test]
async fn user_stats_degrade_to_zeroes() {
    let app = common::create_test_app().await;

    let response = app.oneshot(get_as_user("/api/user/stats", 42)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["wordsLearned"], 0);
    assert_eq!(body["streak"], 0);
    assert_eq!(body["accuracy"], 0);
}

#[tokio::test]
async fn progress_writes_fail_without_identity() {
    let app = common::create_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/user-progress/update-section")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({"lessonId": 1, "section": "vocab"}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn progress_writes_need_the_store() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(post_as_user(
            "/api/user-progress/update-section",
            42,
            serde_json::json!({"lessonId": 1, "section": "vocab"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = json_body(response).await;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn progress_writes_accept_snake_case_bodies() {
    let app = common::create_test_app().await;

    // Documented body spelling: {lesson_id, section}. Degraded mode still
    // reaches the store check (503), not a deserialization failure.
    let response = app
        .clone()
        .oneshot(post_as_user(
            "/api/user-progress/update-section",
            42,
            serde_json::json!({"lesson_id": 1, "section": "vocab"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .oneshot(post_as_user(
            "/api/user-progress/complete-lesson",
            42,
            serde_json::json!({"lesson_id": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn invalid_section_in_snake_case_body_is_still_validated() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(post_as_user(
            "/api/user-progress/update-section",
            42,
            serde_json::json!({"lesson_id": 1, "section": "listening"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_section_is_rejected_before_store_checks() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(post_as_user(
            "/api/user-progress/update-section",
            42,
            serde_json::json!({"lessonId": 1, "section": "listening"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("listening"));
}

#[tokio::test]
async fn health_live_and_ready_without_database() {
    let app = common::create_test_app().await;

    let response = app.clone().oneshot(get("/health/live")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn user_sync_needs_the_store() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(post_as_user("/api/users/sync", 42, serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn favorites_degrade_to_empty_but_writes_fail() {
    let app = common::create_test_app().await;

    let response = app
        .clone()
        .oneshot(get_as_user("/api/favorites", 42))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!([]));

    let response = app
        .oneshot(post_as_user(
            "/api/favorites",
            42,
            serde_json::json!({"vocabularyId": 3}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn study_summary_degrades_to_empty_week() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(get_as_user("/api/study-sessions/summary", 42))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["todayMinutes"], 0);
    assert_eq!(body["streakDays"], 0);
    assert_eq!(body["week"].as_array().unwrap().len(), 7);
    assert_eq!(body["week"][0]["day"], "Monday");
}

#[tokio::test]
async fn admin_is_disabled_without_secret() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(get("/api/admin/vocabulary"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn admin_rejects_a_wrong_password() {
    let app = app_with_admin_secret("sesame");

    let request = Request::builder()
        .uri("/api/admin/vocabulary")
        .header("x-admin-password", "wrong")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_vocabulary_listing_never_serves_the_fallback() {
    let app = app_with_admin_secret("sesame");

    let request = Request::builder()
        .uri("/api/admin/vocabulary")
        .header("x-admin-password", "sesame")
        .body(Body::empty())
        .unwrap();

    // Without a store the public listing serves 8 fallback entries; the
    // admin listing must fail instead.
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = json_body(response).await;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn unknown_routes_report_not_found() {
    let app = common::create_test_app().await;

    let response = app.oneshot(get("/nonexistent/path")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
}
