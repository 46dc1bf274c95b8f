use axum::http::StatusCode;
use dealership::auth::{jwt::TOKEN_COOKIE_NAME, AccountRole};
use dealership::storage::AccountRepository;

use crate::support::{setup_test_app, PASSWORD};

#[tokio::test]
async fn profile_edit_reissues_the_token_with_new_email() {
    let app = setup_test_app();
    let id = app.register_and_login("Basic", "basic@example.com").await;
    let old_token = app.cookie(TOKEN_COOKIE_NAME).unwrap();

    let response = app
        .post_form(
            "/account/update",
            &[
                ("account_id", &id.to_string()),
                ("account_firstname", "Renamed"),
                ("account_lastname", "Client"),
                ("account_email", "renamed@example.com"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/management"));

    let new_token = app.cookie(TOKEN_COOKIE_NAME).expect("token replaced");
    assert_ne!(new_token, old_token);
    let snapshot = app.state.tokens.verify(&new_token).unwrap();
    assert_eq!(snapshot.email, "renamed@example.com");
    assert_eq!(snapshot.first_name, "Renamed");

    let page = app.get("/account/management").await;
    assert!(page.body.contains("Account updated successfully."));
    assert!(page.body.contains("Welcome Renamed"));
}

#[tokio::test]
async fn client_cannot_edit_another_account() {
    let app = setup_test_app();
    let victim = app.register_and_login("Victim", "victim@example.com").await;
    app.clear_cookies();
    let attacker = app.register_and_login("Attacker", "attacker@example.com").await;

    let response = app
        .post_form(
            "/account/update",
            &[
                ("account_id", &victim.to_string()),
                ("account_firstname", "Pwned"),
                ("account_lastname", "Client"),
                ("account_email", "pwned@example.com"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(format!("/account/update/{}", attacker).as_str()));

    let page = app.get(&format!("/account/update/{}", attacker)).await;
    assert!(page.body.contains("You can only update your own account."));

    let stored = app.accounts.get_account(victim.into()).await.unwrap().unwrap();
    assert_eq!(stored.first_name, "Victim");
}

#[tokio::test]
async fn client_cannot_open_another_edit_form() {
    let app = setup_test_app();
    let victim = app.register_and_login("Victim", "victim@example.com").await;
    app.clear_cookies();
    let attacker = app.register_and_login("Attacker", "attacker@example.com").await;

    let response = app.get(&format!("/account/update/{}", victim)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(format!("/account/update/{}", attacker).as_str()));
}

#[tokio::test]
async fn admin_edit_of_another_account_keeps_admin_token() {
    let app = setup_test_app();
    let client = app.register_and_login("Client", "client@example.com").await;
    app.clear_cookies();
    app.register("Admin", "Person", "admin@example.com").await;
    app.set_role("admin@example.com", AccountRole::Admin).await;
    app.login("admin@example.com", PASSWORD).await;
    let admin_token = app.cookie(TOKEN_COOKIE_NAME).unwrap();

    let form = app.get(&format!("/account/update/{}", client)).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("value=\"client@example.com\""));

    let response = app
        .post_form(
            "/account/update",
            &[
                ("account_id", &client.to_string()),
                ("account_firstname", "Edited"),
                ("account_lastname", "Client"),
                ("account_email", "client@example.com"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.set_cookie(TOKEN_COOKIE_NAME).is_none());
    assert_eq!(app.cookie(TOKEN_COOKIE_NAME).unwrap(), admin_token);

    let stored = app.accounts.get_account(client.into()).await.unwrap().unwrap();
    assert_eq!(stored.first_name, "Edited");
}

#[tokio::test]
async fn missing_account_redirects_to_management() {
    let app = setup_test_app();
    app.register("Admin", "Person", "admin@example.com").await;
    app.set_role("admin@example.com", AccountRole::Admin).await;
    app.login("admin@example.com", PASSWORD).await;

    let response = app
        .post_form(
            "/account/update",
            &[
                ("account_id", "999"),
                ("account_firstname", "Nobody"),
                ("account_lastname", "Here"),
                ("account_email", "nobody@example.com"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/management"));

    let page = app.get("/account/management").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("That account could not be found."));

    let response = app.get("/account/update/999").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/management"));

    let response = app
        .post_form(
            "/account/update-password",
            &[("account_id", "999"), ("account_password", PASSWORD)],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/management"));
}

#[tokio::test]
async fn invalid_profile_edit_rerenders_with_errors() {
    let app = setup_test_app();
    let id = app.register_and_login("Basic", "basic@example.com").await;

    let response = app
        .post_form(
            "/account/update",
            &[
                ("account_id", &id.to_string()),
                ("account_firstname", "Basic"),
                ("account_lastname", "Client"),
                ("account_email", "broken"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("A valid email is required."));
    assert!(response.body.contains("value=\"broken\""));
}

#[tokio::test]
async fn taken_email_fails_the_update() {
    let app = setup_test_app();
    app.register("Other", "Person", "taken@example.com").await;
    let id = app.register_and_login("Basic", "basic@example.com").await;

    let response = app
        .post_form(
            "/account/update",
            &[
                ("account_id", &id.to_string()),
                ("account_firstname", "Basic"),
                ("account_lastname", "Client"),
                ("account_email", "taken@example.com"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(format!("/account/update/{}", id).as_str()));

    let page = app.get(&format!("/account/update/{}", id)).await;
    assert!(page.body.contains("Update failed."));
}

#[tokio::test]
async fn password_update_allows_login_with_new_password() {
    let app = setup_test_app();
    let id = app.register_and_login("Basic", "basic@example.com").await;
    let token = app.cookie(TOKEN_COOKIE_NAME).unwrap();

    let response = app
        .post_form(
            "/account/update-password",
            &[("account_id", &id.to_string()), ("account_password", "N3w!PasswordHere")],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/account/management"));
    assert!(response.set_cookie(TOKEN_COOKIE_NAME).is_none());
    assert_eq!(app.cookie(TOKEN_COOKIE_NAME).unwrap(), token);

    let page = app.get("/account/management").await;
    assert!(page.body.contains("Password updated successfully."));

    app.clear_cookies();
    assert_eq!(app.login("basic@example.com", PASSWORD).await.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        app.login("basic@example.com", "N3w!PasswordHere").await.status,
        StatusCode::SEE_OTHER
    );
}

#[tokio::test]
async fn weak_password_update_is_rejected() {
    let app = setup_test_app();
    let id = app.register_and_login("Basic", "basic@example.com").await;

    let response = app
        .post_form(
            "/account/update-password",
            &[("account_id", &id.to_string()), ("account_password", "short")],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("value=\"basic@example.com\""));

    app.clear_cookies();
    assert_eq!(app.login("basic@example.com", PASSWORD).await.status, StatusCode::SEE_OTHER);
}
