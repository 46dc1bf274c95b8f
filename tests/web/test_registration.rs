use axum::http::StatusCode;
use dealership::storage::AccountRepository;

use crate::support::{setup_test_app, PASSWORD};

#[tokio::test]
async fn registration_then_login_succeeds() {
    let app = setup_test_app();

    let response = app.register("Basic", "Client", "basic@example.com").await;
    assert_eq!(response.status, StatusCode::CREATED);
    // The apostrophe is HTML-escaped by the view.
    assert!(response.body.contains("Congratulations, you&#x27;re registered Basic. Please log in."));
    assert!(response.body.contains("flash-success"));

    let response = app.login("basic@example.com", PASSWORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/management"));
}

#[tokio::test]
async fn duplicate_email_is_rejected_without_a_new_row() {
    let app = setup_test_app();
    app.register("Basic", "Client", "basic@example.com").await;

    let response = app.register("Other", "Person", "BASIC@example.com").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("Sorry, the registration failed."));
    // Names and email are repopulated, the password never is.
    assert!(response.body.contains("value=\"Other\""));
    assert!(!response.body.contains(PASSWORD));

    let stored = app.accounts.get_account_by_email("basic@example.com").await.unwrap().unwrap();
    assert_eq!(stored.first_name, "Basic");
    assert_eq!(app.account_id("basic@example.com").await, 1);
    assert!(app.accounts.get_account(2.into()).await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_registration_lists_field_errors() {
    let app = setup_test_app();

    let response = app
        .post_form(
            "/account/register",
            &[
                ("account_firstname", "Basic"),
                ("account_lastname", "C"),
                ("account_email", "not-an-email"),
                ("account_password", "weak"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("Please provide a last name."));
    assert!(response.body.contains("A valid email is required."));
    assert!(response.body.contains("value=\"not-an-email\""));
    assert!(!response.body.contains("value=\"weak\""));
    assert!(app.accounts.get_account(1.into()).await.unwrap().is_none());
}
