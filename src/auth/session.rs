//! Server-side sessions and flash messages.
//!
//! Every browser gets a session record keyed by the `sessionId` cookie. The
//! record only carries flash messages; identity lives in the `jwt` cookie and
//! the two are independent. Handlers reach the session through the [`Session`]
//! request extension; the session layer persists it after the handler returns.

use std::sync::{Arc, Mutex, MutexGuard};

use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::SessionConfig;
use crate::errors::Result;
use crate::observability::metrics;
use crate::storage::repositories::SessionRepository;

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "sessionId";

/// Session id byte length (32 bytes = 256 bits of entropy)
const SESSION_ID_BYTES: usize = 32;

/// Flash message severity, rendered as a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Notice,
    Info,
}

/// A one-read message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

/// Payload stored in `session.sess`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub flash: Vec<FlashMessage>,
}

/// A persisted session row.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub data: SessionData,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug)]
struct SessionState {
    id: String,
    data: SessionData,
    is_new: bool,
    dirty: bool,
    /// Ids whose records must be deleted when the session is committed
    retired: Vec<String>,
}

/// Handle to the current request's session, shared through request extensions.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    fn new(id: String, data: SessionData, is_new: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                id,
                data,
                is_new,
                dirty: false,
                retired: Vec::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // No code path panics while holding the lock; recover the data regardless.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn id(&self) -> String {
        self.state().id.clone()
    }

    /// Queue a flash message for the next rendered page.
    pub fn flash<S: Into<String>>(&self, kind: FlashKind, text: S) {
        let mut state = self.state();
        state.data.flash.push(FlashMessage { kind, text: text.into() });
        state.dirty = true;
    }

    /// Remove and return all pending flash messages.
    pub fn take_flash(&self) -> Vec<FlashMessage> {
        let mut state = self.state();
        if state.data.flash.is_empty() {
            return Vec::new();
        }
        state.dirty = true;
        std::mem::take(&mut state.data.flash)
    }

    /// Destroy the current record and continue under a fresh, empty session.
    pub fn regenerate(&self) {
        let mut state = self.state();
        let old_id = std::mem::replace(&mut state.id, generate_session_id());
        state.retired.push(old_id);
        state.data = SessionData::default();
        state.is_new = true;
        state.dirty = true;
    }
}

/// Loads, creates and persists [`Session`]s.
#[derive(Clone)]
pub struct SessionStore {
    repository: Arc<dyn SessionRepository>,
    ttl: Duration,
    secure_cookies: bool,
}

impl SessionStore {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        config: &SessionConfig,
        secure_cookies: bool,
    ) -> Self {
        Self {
            repository,
            ttl: Duration::seconds(config.ttl_seconds as i64),
            secure_cookies,
        }
    }

    /// Resume the session named by the cookie, or start a new one.
    #[instrument(skip(self, session_id), name = "session_load")]
    pub async fn load_or_create(&self, session_id: Option<&str>) -> Result<Session> {
        if let Some(id) = session_id.filter(|id| !id.is_empty()) {
            if let Some(record) = self.repository.load(id).await? {
                if !record.is_expired(Utc::now()) {
                    return Ok(Session::new(record.id, record.data, false));
                }
                debug!("session expired, starting a new one");
            }
        }

        Ok(Session::new(generate_session_id(), SessionData::default(), true))
    }

    /// Persist pending changes. Returns the cookie to set when the browser
    /// needs to learn a new session id.
    #[instrument(skip(self, session), name = "session_commit")]
    pub async fn commit(&self, session: &Session) -> Result<Option<Cookie<'static>>> {
        let (record, retired, is_new) = {
            let mut state = session.state();
            if !state.dirty && !state.is_new {
                return Ok(None);
            }
            let record = SessionRecord {
                id: state.id.clone(),
                data: state.data.clone(),
                expires_at: Utc::now() + self.ttl,
            };
            let retired = std::mem::take(&mut state.retired);
            let is_new = state.is_new;
            state.dirty = false;
            state.is_new = false;
            (record, retired, is_new)
        };

        for old_id in &retired {
            self.repository.destroy(old_id).await?;
            metrics::record_session_destroyed().await;
        }

        self.repository.save(&record).await?;

        Ok(is_new.then(|| self.cookie(record.id)))
    }

    /// Delete every expired record, returning how many were removed.
    pub async fn delete_expired(&self) -> Result<u64> {
        self.repository.delete_expired(Utc::now()).await
    }

    fn cookie(&self, id: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, id))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .into()
    }
}

fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
