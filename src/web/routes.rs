use std::path::Path;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::middleware::{require_elevated, require_login, resolve_identity, session_layer};
use crate::observability::track_http_requests;

use super::{
    error::{not_found, render_error_pages},
    handlers::{account, health, home, inventory},
    state::AppState,
};

/// Assemble the site.
///
/// Middleware runs outermost first: request span, metrics, session, identity,
/// error pages, then the per-route gates.
pub fn build_router(state: AppState) -> Router {
    let login_only = Router::new()
        .route("/account/", get(account::management))
        .route("/account/management", get(account::management))
        .route("/account/update/{account_id}", get(account::update_form))
        .route("/account/update", post(account::update))
        .route("/account/update-password", post(account::update_password))
        .route_layer(middleware::from_fn(require_login));

    let elevated_only = Router::new()
        .route("/inv/", get(inventory::management))
        .route_layer(middleware::from_fn(require_elevated));

    let public = Router::new()
        .route("/", get(home::index))
        .route("/account/login", get(account::login_form).post(account::login))
        .route("/account/register", get(account::register_form).post(account::register))
        .route("/account/logout", get(account::logout))
        .route("/inv/type/{classification_id}", get(inventory::by_classification))
        .route("/inv/detail/{inv_id}", get(inventory::detail))
        .route("/inv/test/error", get(inventory::trigger_error));

    let site = Router::new()
        .merge(public)
        .merge(login_only)
        .merge(elevated_only)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), render_error_pages))
        .layer(middleware::from_fn_with_state(state.tokens.clone(), resolve_identity))
        .layer(middleware::from_fn_with_state(state.sessions.clone(), session_layer));

    let public_dir = Path::new(&state.config.server.public_dir);
    // Probes and assets stay outside the session layer so they never create sessions.
    let operations = Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .nest_service("/css", ServeDir::new(public_dir.join("css")))
        .nest_service("/js", ServeDir::new(public_dir.join("js")))
        .nest_service("/images", ServeDir::new(public_dir.join("images")));

    Router::new()
        .merge(site)
        .merge(operations)
        .layer(middleware::from_fn(track_http_requests))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            crate::request_span!(request.method(), request.uri().path())
        }))
        .with_state(state)
}
