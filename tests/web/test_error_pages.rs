use axum::http::StatusCode;
use dealership::web::error::{CRASH_MESSAGE, LOST_PAGE_MESSAGE};

use crate::support::setup_test_app;

#[tokio::test]
async fn intentional_error_renders_the_crash_page() {
    let app = setup_test_app();

    let response = app.get("/inv/test/error").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body.contains(CRASH_MESSAGE));
    assert!(!response.body.contains("Intentional test error"));
    assert!(response.body.contains("<nav class=\"main-nav\">"));
}

#[tokio::test]
async fn unknown_routes_render_the_lost_page() {
    let app = setup_test_app();

    let response = app.get("/no/such/page").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains(LOST_PAGE_MESSAGE));
}

#[tokio::test]
async fn health_reports_ok_without_a_session() {
    let app = setup_test_app();

    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["status"], "ok");
    assert!(response.headers.get("set-cookie").is_none());
    assert!(app.sessions.is_empty().await);
}

#[tokio::test]
async fn metrics_are_absent_when_disabled() {
    let app = setup_test_app();
    assert_eq!(app.get("/metrics").await.status, StatusCode::NOT_FOUND);
}
