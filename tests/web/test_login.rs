use axum::http::StatusCode;
use dealership::{
    auth::jwt::{PRE_LOGIN_COOKIE_NAME, TOKEN_COOKIE_NAME, TOKEN_TTL_SECONDS},
    config::Environment,
    storage::memory::MemoryInventoryRepository,
};

use crate::support::{setup_test_app, setup_test_app_with, PASSWORD};

#[tokio::test]
async fn login_sets_secure_http_only_cookie_in_production() {
    let app = setup_test_app_with(
        Environment::Production,
        MemoryInventoryRepository::with_sample_data(),
    );
    app.register("Basic", "Client", "basic@example.com").await;

    let response = app.login("basic@example.com", PASSWORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let cookie = response.set_cookie(TOKEN_COOKIE_NAME).expect("jwt cookie");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.max_age().map(|age| age.whole_seconds()), Some(TOKEN_TTL_SECONDS));
    assert_eq!(cookie.path(), Some("/"));
}

#[tokio::test]
async fn development_cookies_are_not_secure() {
    let app = setup_test_app();
    app.register("Basic", "Client", "basic@example.com").await;

    let response = app.login("basic@example.com", PASSWORD).await;
    let cookie = response.set_cookie(TOKEN_COOKIE_NAME).expect("jwt cookie");
    assert_eq!(cookie.http_only(), Some(true));
    assert_ne!(cookie.secure(), Some(true));
}

#[tokio::test]
async fn login_clears_pre_login_cookie() {
    let app = setup_test_app();
    app.register("Basic", "Client", "basic@example.com").await;
    app.set_cookie(PRE_LOGIN_COOKIE_NAME, "basic@example.com");

    let response = app.login("basic@example.com", PASSWORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.set_cookie(PRE_LOGIN_COOKIE_NAME).is_some());
    assert!(app.cookie(PRE_LOGIN_COOKIE_NAME).is_none());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = setup_test_app();
    app.register("Basic", "Client", "basic@example.com").await;

    let wrong = app.login("basic@example.com", "Wrong!Password1").await;
    let unknown = app.login("ghost@example.com", PASSWORD).await;

    for response in [&wrong, &unknown] {
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Please check your credentials and try again."));
        assert!(response.set_cookie(TOKEN_COOKIE_NAME).is_none());
    }
    assert!(wrong.body.contains("value=\"basic@example.com\""));
    assert!(!wrong.body.contains("Wrong!Password1"));
}

#[tokio::test]
async fn logged_in_pages_show_the_account() {
    let app = setup_test_app();
    app.register_and_login("Basic", "basic@example.com").await;

    let response = app.get("/account/management").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Welcome Basic"));
    assert!(!response.body.contains("/inv/\""));
}

#[tokio::test]
async fn tampered_token_is_cleared_and_treated_as_anonymous() {
    let app = setup_test_app();
    app.register_and_login("Basic", "basic@example.com").await;
    let token = app.cookie(TOKEN_COOKIE_NAME).unwrap();
    app.set_cookie(TOKEN_COOKIE_NAME, &format!("{}x", token));

    let response = app.get("/account/management").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/login"));
    assert!(app.cookie(TOKEN_COOKIE_NAME).is_none());
}
