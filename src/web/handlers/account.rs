//! Account pages: registration, login, management, profile edits and logout.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{error, warn};

use crate::auth::account_validation::{
    field_errors, AccountUpdateForm, LoginForm, PasswordUpdateForm, RegistrationForm,
};
use crate::auth::authorization::{self, account_update_path, LOGIN_PATH};
use crate::auth::jwt::{removal_cookie, token_cookie, PRE_LOGIN_COOKIE_NAME, TOKEN_COOKIE_NAME};
use crate::auth::session::FlashKind;
use crate::domain::AccountId;
use crate::errors::Error;
use crate::web::error::WebError;
use crate::web::state::AppState;
use crate::web::views::{Chrome, Page};

pub const MANAGEMENT_PATH: &str = "/account/management";

const LOGIN_FAILED: &str = "Please check your credentials and try again.";
const REGISTRATION_FAILED: &str = "Sorry, the registration failed.";
const UPDATE_FAILED: &str = "Update failed.";
const PASSWORD_UPDATE_FAILED: &str = "Password update failed.";
const ACCOUNT_MISSING: &str = "That account could not be found.";

type HandlerResult = Result<Response, WebError>;

fn form_body<T>(form: Result<Form<T>, FormRejection>) -> Result<T, WebError> {
    form.map(|Form(body)| body).map_err(|rejection| {
        warn!(error = %rejection, "rejected form body");
        WebError::bad_request("The submitted form could not be read.")
    })
}

fn login_page(status: StatusCode, email: &str) -> Page {
    Page::new("account/login", "Login").status(status).with("account_email", json!(email))
}

fn register_page(status: StatusCode, form: &RegistrationForm) -> Page {
    // The password is never echoed back.
    Page::new("account/register", "Register")
        .status(status)
        .with("account_firstname", json!(form.account_firstname))
        .with("account_lastname", json!(form.account_lastname))
        .with("account_email", json!(form.account_email))
}

fn update_page(status: StatusCode, account: serde_json::Value) -> Page {
    Page::new("account/update", "Update Account").status(status).with("account_data", account)
}

/// GET /account/ and /account/management
pub async fn management(State(state): State<AppState>, chrome: Chrome) -> HandlerResult {
    state.render(&chrome, Page::new("account/management", "Account Management")).await
}

/// GET /account/login
pub async fn login_form(
    State(state): State<AppState>,
    chrome: Chrome,
    jar: CookieJar,
) -> HandlerResult {
    let email = jar.get(PRE_LOGIN_COOKIE_NAME).map(|c| c.value().to_string()).unwrap_or_default();
    state.render(&chrome, login_page(StatusCode::OK, &email)).await
}

/// POST /account/login
pub async fn login(
    State(state): State<AppState>,
    chrome: Chrome,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> HandlerResult {
    let form = form_body(form)?;

    match state.accounts.login(&form).await {
        Ok((_, issued)) => {
            let jar = jar
                .add(token_cookie(issued.token, state.secure_cookies()))
                .remove(removal_cookie(PRE_LOGIN_COOKIE_NAME));
            Ok((jar, Redirect::to(MANAGEMENT_PATH)).into_response())
        }
        Err(e @ Error::Validation { .. }) => {
            let page = login_page(StatusCode::BAD_REQUEST, &form.account_email)
                .errors(&field_errors(&e));
            state.render(&chrome, page).await
        }
        Err(Error::Auth { .. }) => {
            chrome.flash(FlashKind::Error, LOGIN_FAILED);
            state.render(&chrome, login_page(StatusCode::BAD_REQUEST, &form.account_email)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /account/register
pub async fn register_form(State(state): State<AppState>, chrome: Chrome) -> HandlerResult {
    state.render(&chrome, register_page(StatusCode::OK, &RegistrationForm::default())).await
}

/// POST /account/register
pub async fn register(
    State(state): State<AppState>,
    chrome: Chrome,
    form: Result<Form<RegistrationForm>, FormRejection>,
) -> HandlerResult {
    let form = form_body(form)?;

    match state.accounts.register(&form).await {
        Ok(account) => {
            chrome.flash(
                FlashKind::Success,
                format!("Congratulations, you're registered {}. Please log in.", account.first_name),
            );
            state.render(&chrome, login_page(StatusCode::CREATED, "")).await
        }
        Err(e @ Error::Validation { .. }) => {
            let page = register_page(StatusCode::BAD_REQUEST, &form).errors(&field_errors(&e));
            state.render(&chrome, page).await
        }
        Err(e) => {
            if !matches!(e, Error::DuplicateEmail) {
                error!(error = %e, "registration failed");
            }
            chrome.flash(FlashKind::Error, REGISTRATION_FAILED);
            state.render(&chrome, register_page(StatusCode::BAD_REQUEST, &form)).await
        }
    }
}

/// GET /account/update/{account_id}
pub async fn update_form(
    State(state): State<AppState>,
    chrome: Chrome,
    Path(raw_id): Path<String>,
) -> HandlerResult {
    let account_id: AccountId =
        raw_id.parse().map_err(|_| WebError::bad_request("Invalid account ID"))?;

    if let Err(e) = authorization::require_owner_or_admin(&chrome.context, account_id) {
        return Ok(deny(&chrome, e));
    }

    match state.credentials().find(account_id).await {
        Ok(account) => state.render(&chrome, update_page(StatusCode::OK, json!(account))).await,
        Err(Error::NotFound { .. }) => Ok(missing_account(&chrome)),
        Err(e) => Err(e.into()),
    }
}

/// POST /account/update
pub async fn update(
    State(state): State<AppState>,
    chrome: Chrome,
    jar: CookieJar,
    form: Result<Form<AccountUpdateForm>, FormRejection>,
) -> HandlerResult {
    let form = form_body(form)?;

    match state.accounts.update_account(&chrome.context, &form).await {
        Ok(updated) => {
            chrome.flash(FlashKind::Success, "Account updated successfully.");
            let redirect = Redirect::to(MANAGEMENT_PATH);
            match updated.reissued {
                Some(issued) => {
                    let jar = jar.add(token_cookie(issued.token, state.secure_cookies()));
                    Ok((jar, redirect).into_response())
                }
                None => Ok(redirect.into_response()),
            }
        }
        Err(e @ (Error::Authorization { .. } | Error::Auth { .. })) => Ok(deny(&chrome, e)),
        Err(Error::NotFound { .. }) => Ok(missing_account(&chrome)),
        Err(e @ Error::Validation { .. }) => {
            let account = json!({
                "account_id": form.account_id,
                "account_firstname": form.account_firstname,
                "account_lastname": form.account_lastname,
                "account_email": form.account_email,
            });
            let page = update_page(StatusCode::BAD_REQUEST, account).errors(&field_errors(&e));
            state.render(&chrome, page).await
        }
        Err(e) => {
            warn!(error = %e, account_id = %form.account_id, "account update failed");
            chrome.flash(FlashKind::Error, UPDATE_FAILED);
            Ok(Redirect::to(&account_update_path(form.account_id)).into_response())
        }
    }
}

/// POST /account/update-password
pub async fn update_password(
    State(state): State<AppState>,
    chrome: Chrome,
    form: Result<Form<PasswordUpdateForm>, FormRejection>,
) -> HandlerResult {
    let form = form_body(form)?;

    match state.accounts.update_password(&chrome.context, &form).await {
        Ok(()) => {
            chrome.flash(FlashKind::Success, "Password updated successfully.");
            Ok(Redirect::to(MANAGEMENT_PATH).into_response())
        }
        Err(e @ (Error::Authorization { .. } | Error::Auth { .. })) => Ok(deny(&chrome, e)),
        Err(Error::NotFound { .. }) => Ok(missing_account(&chrome)),
        Err(e @ Error::Validation { .. }) => {
            let account = match state.credentials().find(form.account_id).await {
                Ok(account) => json!(account),
                Err(_) => json!({ "account_id": form.account_id }),
            };
            let page = update_page(StatusCode::BAD_REQUEST, account).errors(&field_errors(&e));
            state.render(&chrome, page).await
        }
        Err(e) => {
            warn!(error = %e, account_id = %form.account_id, "password update failed");
            chrome.flash(FlashKind::Error, PASSWORD_UPDATE_FAILED);
            Ok(Redirect::to(&account_update_path(form.account_id)).into_response())
        }
    }
}

/// GET /account/logout
pub async fn logout(State(state): State<AppState>, chrome: Chrome, jar: CookieJar) -> Response {
    if let Some(session) = &chrome.session {
        state.accounts.logout(&chrome.context, session);
    }
    let jar = jar.remove(removal_cookie(TOKEN_COOKIE_NAME));
    (jar, Redirect::to(LOGIN_PATH)).into_response()
}

/// Turn a failed gate into the flash and redirect the caller sees.
fn deny(chrome: &Chrome, err: Error) -> Response {
    match err {
        Error::Authorization { message, redirect_to } => {
            chrome.flash(FlashKind::Error, message);
            Redirect::to(&redirect_to).into_response()
        }
        _ => {
            chrome.flash(FlashKind::Info, "Please log in.");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

/// A missing target account sends the caller back to the management page.
fn missing_account(chrome: &Chrome) -> Response {
    chrome.flash(FlashKind::Error, ACCOUNT_MISSING);
    Redirect::to(MANAGEMENT_PATH).into_response()
}
