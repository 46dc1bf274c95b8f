use axum::http::StatusCode;
use dealership::auth::{jwt::TOKEN_COOKIE_NAME, session::SESSION_COOKIE_NAME, AccountRole};

use crate::support::{setup_test_app, PASSWORD};

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login_with_info_flash() {
    let app = setup_test_app();

    let response = app.get("/account/management").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/login"));

    let login = app.get("/account/login").await;
    assert!(login.body.contains("flash-info"));
    assert!(login.body.contains("Please log in."));
}

#[tokio::test]
async fn logout_then_protected_route_redirects_with_info_flash() {
    let app = setup_test_app();
    app.register_and_login("Basic", "basic@example.com").await;
    let session_before = app.cookie(SESSION_COOKIE_NAME).unwrap();

    let response = app.get("/account/logout").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/login"));
    assert!(app.cookie(TOKEN_COOKIE_NAME).is_none());
    let session_after = app.cookie(SESSION_COOKIE_NAME).expect("fresh session");
    assert_ne!(session_before, session_after);

    let response = app.get("/account/management").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/login"));

    let login = app.get("/account/login").await;
    assert!(login.body.contains("You have been logged out."));
    assert!(login.body.contains("Please log in."));
    assert!(login.body.contains("flash-info"));

    // Flash messages are shown once.
    let again = app.get("/account/login").await;
    assert!(!again.body.contains("You have been logged out."));
}

#[tokio::test]
async fn logout_destroys_the_old_session_record() {
    let app = setup_test_app();
    app.register_and_login("Basic", "basic@example.com").await;
    assert_eq!(app.sessions.len().await, 1);

    app.get("/account/logout").await;
    assert_eq!(app.sessions.len().await, 1);
}

#[tokio::test]
async fn inventory_management_requires_elevated_role() {
    let app = setup_test_app();

    let response = app.get("/inv/").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/login"));

    app.register_and_login("Basic", "basic@example.com").await;
    let response = app.get("/inv/").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let login = app.get("/account/login").await;
    assert!(login.body.contains("flash-error"));
}

#[tokio::test]
async fn employees_reach_inventory_management() {
    let app = setup_test_app();
    app.register("Staff", "Member", "staff@example.com").await;
    app.set_role("staff@example.com", AccountRole::Employee).await;
    app.login("staff@example.com", PASSWORD).await;

    let response = app.get("/inv/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Vehicle Management"));

    let management = app.get("/account/management").await;
    assert!(management.body.contains("/inv/\""));
}
