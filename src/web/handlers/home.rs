//! Home page.

use axum::{extract::State, response::Response};

use crate::web::error::WebError;
use crate::web::state::AppState;
use crate::web::views::{Chrome, Page};

/// GET /
pub async fn index(State(state): State<AppState>, chrome: Chrome) -> Result<Response, WebError> {
    state.render(&chrome, Page::new("index", "Home")).await
}
