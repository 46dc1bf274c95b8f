//! Background maintenance for server-side sessions.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::auth::session::SessionStore;
use crate::errors::Result;
use crate::observability::metrics;

#[derive(Clone)]
pub struct CleanupService {
    sessions: SessionStore,
}

impl CleanupService {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    /// Delete expired session records once.
    pub async fn run_once(&self) -> Result<u64> {
        let removed = self.sessions.delete_expired().await?;
        if removed > 0 {
            info!(removed, "expired sessions removed");
            metrics::record_sessions_expired(removed).await;
        } else {
            debug!("no expired sessions");
        }
        Ok(removed)
    }

    /// Sweep on a fixed interval until the task is aborted.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    error!(error = %e, "session cleanup failed");
                }
            }
        })
    }
}
