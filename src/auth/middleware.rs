//! Axum middleware for sessions, identity and route gating.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, State},
    http::{header::SET_COOKIE, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error, field, warn};

use crate::auth::authorization::{self, LOGIN_PATH};
use crate::auth::jwt::{removal_cookie, TokenError, TokenIssuer, TOKEN_COOKIE_NAME};
use crate::auth::models::AuthContext;
use crate::auth::session::{FlashKind, Session, SessionStore, SESSION_COOKIE_NAME};
use crate::observability::metrics;
use crate::web::error::WebError;

pub type TokenIssuerState = Arc<TokenIssuer>;

/// Load (or start) the caller's session, expose it as a [`Session`] extension
/// and persist it once the handler has run.
pub async fn session_layer(
    State(store): State<SessionStore>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, WebError> {
    let session_id = jar.get(SESSION_COOKIE_NAME).map(|cookie| cookie.value().to_string());
    let session = store.load_or_create(session_id.as_deref()).await?;
    request.extensions_mut().insert(session.clone());

    let response = next.run(request).await;

    match store.commit(&session).await {
        Ok(Some(cookie)) => Ok((CookieJar::new().add(cookie), response).into_response()),
        Ok(None) => Ok(response),
        Err(e) => {
            error!(error = %e, "failed to persist session");
            Ok(response)
        }
    }
}

/// Verify the `jwt` cookie once per request and insert the [`AuthContext`].
///
/// A cookie that fails verification is cleared and the request continues
/// anonymously.
pub async fn resolve_identity(
    State(issuer): State<TokenIssuerState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let mut stale_cookie = false;
    let context = match jar.get(TOKEN_COOKIE_NAME) {
        None => AuthContext::Anonymous,
        Some(cookie) => match issuer.verify(cookie.value()) {
            Ok(account) => {
                tracing::Span::current().record("account_id", field::display(account.id));
                AuthContext::Authenticated(account)
            }
            Err(err) => {
                debug!(error = %err, "rejecting identity token");
                metrics::record_token_rejected(token_error_label(err)).await;
                stale_cookie = true;
                AuthContext::Anonymous
            }
        },
    };

    request.extensions_mut().insert(context);
    let response = next.run(request).await;

    if stale_cookie && !sets_cookie(response.headers(), TOKEN_COOKIE_NAME) {
        return (jar.remove(removal_cookie(TOKEN_COOKIE_NAME)), response).into_response();
    }
    response
}

/// Gate for pages that need a logged-in account.
pub async fn require_login(
    Extension(context): Extension<AuthContext>,
    Extension(session): Extension<Session>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if authorization::require_authenticated(&context).is_ok() {
        return next.run(request).await;
    }

    session.flash(FlashKind::Info, "Please log in.");
    Redirect::to(LOGIN_PATH).into_response()
}

/// Gate for inventory management: employees and admins only.
pub async fn require_elevated(
    Extension(context): Extension<AuthContext>,
    Extension(session): Extension<Session>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match authorization::require_elevated_role(&context) {
        Ok(_) => next.run(request).await,
        Err(err) => {
            warn!(
                account_id = ?context.account_id(),
                path = %request.uri().path(),
                "inventory management denied"
            );
            let message = match context {
                AuthContext::Anonymous => "Please log in.".to_string(),
                AuthContext::Authenticated(_) => auth_message(&err),
            };
            session.flash(FlashKind::Error, message);
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

fn auth_message(err: &crate::errors::Error) -> String {
    match err {
        crate::errors::Error::Auth { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

fn token_error_label(err: TokenError) -> &'static str {
    match err {
        TokenError::Expired => "expired",
        TokenError::InvalidSignature => "invalid_signature",
        TokenError::Malformed => "malformed",
    }
}

/// Whether the response already sets the named cookie.
fn sets_cookie(headers: &HeaderMap, name: &str) -> bool {
    headers.get_all(SET_COOKIE).iter().any(|value| {
        value
            .to_str()
            .ok()
            .and_then(|v| v.split_once('='))
            .is_some_and(|(cookie_name, _)| cookie_name.trim() == name)
    })
}
