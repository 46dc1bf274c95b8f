//! Shared application state handed to every handler.

use std::sync::Arc;

use axum::response::{Html, IntoResponse, Response};
use metrics_exporter_prometheus::PrometheusHandle;
use minijinja::Value;
use serde_json::{json, Map, Value as JsonValue};
use tracing::warn;

use crate::auth::account_service::AccountService;
use crate::auth::credential_store::CredentialStore;
use crate::auth::jwt::TokenIssuer;
use crate::auth::session::SessionStore;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::storage::{InventoryRepository, Repositories};
use crate::web::error::WebError;
use crate::web::views::{Chrome, MiniJinjaRenderer, Page, ViewRenderer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: AccountService,
    pub inventory: Arc<dyn InventoryRepository>,
    pub sessions: SessionStore,
    pub tokens: Arc<TokenIssuer>,
    pub views: Arc<dyn ViewRenderer>,
    pub repositories: Repositories,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire services over the given repositories.
    pub fn new(
        config: AppConfig,
        repositories: Repositories,
        metrics: Option<PrometheusHandle>,
    ) -> Result<Self> {
        let tokens = Arc::new(TokenIssuer::new(&config.auth));
        let credentials = CredentialStore::new(repositories.accounts.clone());
        let sessions = SessionStore::new(
            repositories.sessions.clone(),
            &config.session,
            config.environment.secure_cookies(),
        );

        Ok(Self {
            accounts: AccountService::new(credentials, tokens.clone()),
            inventory: repositories.inventory.clone(),
            sessions,
            tokens,
            views: Arc::new(MiniJinjaRenderer::new()?),
            repositories,
            metrics,
            config: Arc::new(config),
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.accounts.credentials()
    }

    /// Whether cookies issued by this process carry `Secure`.
    pub fn secure_cookies(&self) -> bool {
        self.config.environment.secure_cookies()
    }

    /// Render `page` inside the site chrome.
    ///
    /// Pending flash messages are consumed here, so they show exactly once.
    pub async fn render(&self, chrome: &Chrome, page: Page) -> std::result::Result<Response, WebError> {
        let mut context = Map::new();
        context.insert("title".into(), json!(page.title));
        context.insert("nav".into(), self.navigation().await);

        let messages = chrome.session.as_ref().map(|s| s.take_flash()).unwrap_or_default();
        context.insert("messages".into(), serde_json::to_value(messages).unwrap_or_default());

        let account = chrome.context.account();
        context.insert("account".into(), serde_json::to_value(account).unwrap_or_default());
        context.insert(
            "is_elevated".into(),
            json!(account.is_some_and(|a| a.role.is_elevated())),
        );

        context.extend(page.data);

        let html = self
            .views
            .render(page.view, Value::from_serialize(JsonValue::Object(context)))
            .map_err(|e| WebError::internal(e.to_string()))?;
        Ok((page.status, Html(html)).into_response())
    }

    /// Classification links for the navigation bar. A lookup failure degrades
    /// to an empty menu rather than failing the page.
    async fn navigation(&self) -> JsonValue {
        match self.inventory.list_classifications().await {
            Ok(classifications) => serde_json::to_value(classifications).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "failed to load navigation");
                JsonValue::Array(Vec::new())
            }
        }
    }
}

