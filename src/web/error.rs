//! Error responses for the HTML site.
//!
//! Handlers return [`WebError`]; it converts into an empty response carrying
//! an [`ErrorPage`] extension, and [`render_error_pages`] swaps that for the
//! rendered error view so every failure gets the full page layout.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::auth::models::AuthContext;
use crate::auth::session::Session;
use crate::errors::Error;
use crate::web::state::AppState;
use crate::web::views::{Chrome, Page};

/// Message shown for every unexpected failure. Details go to the log only.
pub const CRASH_MESSAGE: &str = "Oh no! There was a crash. Maybe try a different route?";

/// Message shown for unknown routes.
pub const LOST_PAGE_MESSAGE: &str = "Sorry, we appear to have lost that page.";

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl WebError {
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        WebError::BadRequest(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        WebError::NotFound(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        WebError::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Marker left on a response for [`render_error_pages`] to fill in.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            WebError::BadRequest(msg) | WebError::NotFound(msg) => msg,
            WebError::Internal(detail) => {
                error!(error = %detail, "request failed");
                CRASH_MESSAGE.to_string()
            }
        };

        let mut response = (status, message.clone()).into_response();
        response.extensions_mut().insert(ErrorPage { status, message });
        response
    }
}

impl From<Error> for WebError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation { message, .. } => WebError::BadRequest(message),
            Error::NotFound { resource_type, .. } => {
                WebError::NotFound(format!("Sorry, that {} could not be found.", resource_type.to_lowercase()))
            }
            other => WebError::Internal(other.to_string()),
        }
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> WebError {
    WebError::not_found(LOST_PAGE_MESSAGE)
}

/// Replace bare error responses with the rendered error view.
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let chrome = Chrome {
        context: request.extensions().get::<AuthContext>().cloned().unwrap_or_default(),
        session: request.extensions().get::<Session>().cloned(),
    };

    let response = next.run(request).await;
    let Some(page) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let title = page.status.canonical_reason().unwrap_or("Error").to_string();
    let rendered = state
        .render(
            &chrome,
            Page::new("error", title).status(page.status).with("message", json!(page.message)),
        )
        .await;

    match rendered {
        Ok(mut html) => {
            // Keep cookies set by the handler before it failed.
            let (parts, _) = response.into_parts();
            for value in parts.headers.get_all(axum::http::header::SET_COOKIE) {
                html.headers_mut().append(axum::http::header::SET_COOKIE, value.clone());
            }
            html
        }
        Err(e) => {
            error!(error = %e, "failed to render error page");
            response
        }
    }
}
