//! View rendering.
//!
//! Views are MiniJinja templates embedded in the binary. Every page shares the
//! same chrome: classification navigation, pending flash messages and the
//! current account.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};
use minijinja::{default_auto_escape_callback, Environment, Value};
use serde_json::{Map, Value as JsonValue};

use crate::auth::models::AuthContext;
use crate::auth::session::{FlashKind, Session};
use crate::errors::{FieldError, Result};

pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, context: Value) -> Result<String>;
}

/// Embedded templates, keyed by the name views are looked up with.
const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("account/login.html", include_str!("../../templates/account/login.html")),
    ("account/register.html", include_str!("../../templates/account/register.html")),
    ("account/management.html", include_str!("../../templates/account/management.html")),
    ("account/update.html", include_str!("../../templates/account/update.html")),
    ("inventory/classification.html", include_str!("../../templates/inventory/classification.html")),
    ("inventory/detail.html", include_str!("../../templates/inventory/detail.html")),
    ("inventory/management.html", include_str!("../../templates/inventory/management.html")),
];

pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }
}

impl ViewRenderer for MiniJinjaRenderer {
    fn render(&self, view: &str, context: Value) -> Result<String> {
        let template = self.env.get_template(&format!("{}.html", view))?;
        Ok(template.render(context)?)
    }
}

/// Request-scoped pieces every page needs, taken from request extensions.
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    pub context: AuthContext,
    pub session: Option<Session>,
}

impl<S: Send + Sync> FromRequestParts<S> for Chrome {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(Chrome {
            context: parts.extensions.get::<AuthContext>().cloned().unwrap_or_default(),
            session: parts.extensions.get::<Session>().cloned(),
        })
    }
}

impl Chrome {
    /// Queue a flash message on the current session, if there is one.
    pub fn flash<T: Into<String>>(&self, kind: FlashKind, text: T) {
        if let Some(session) = &self.session {
            session.flash(kind, text);
        }
    }
}

/// A page to render: view name, title, status and view-specific data.
#[derive(Debug, Clone)]
pub struct Page {
    pub view: &'static str,
    pub title: String,
    pub status: StatusCode,
    pub data: Map<String, JsonValue>,
}

impl Page {
    pub fn new<T: Into<String>>(view: &'static str, title: T) -> Self {
        Self { view, title: title.into(), status: StatusCode::OK, data: Map::new() }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with<K: Into<String>>(mut self, key: K, value: JsonValue) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Attach field-level validation failures as `errors`.
    pub fn errors(self, errors: &[FieldError]) -> Self {
        let errors = serde_json::to_value(errors).unwrap_or(JsonValue::Array(Vec::new()));
        self.with("errors", errors)
    }
}
