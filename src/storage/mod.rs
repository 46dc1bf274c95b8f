//! # Storage and Persistence
//!
//! PostgreSQL connectivity, embedded migrations and the repositories behind
//! accounts, sessions and inventory. A `memory://` URL swaps every repository
//! for its in-memory counterpart.

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repositories;

use std::sync::Arc;

pub use crate::config::DatabaseConfig;

pub use migrations::{
    get_migration_version, list_applied_migrations, validate_migrations, MigrationInfo,
};
pub use pool::{create_pool, get_pool_stats, sanitize_url, DbPool, PoolStats};
pub use repositories::{
    AccountRepository, InventoryRepository, SessionRepository, SqlxAccountRepository,
    SqlxInventoryRepository, SqlxSessionRepository,
};

use crate::errors::{DealershipError, Result};
use memory::{MemoryAccountRepository, MemoryInventoryRepository, MemorySessionRepository};

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    migrations::run_migrations(pool).await
}

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| DealershipError::database(e, "Database connectivity check failed"))?;

    Ok(())
}

/// The repository set the application runs on.
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    /// Present only for the PostgreSQL backend
    pub pool: Option<DbPool>,
}

impl Repositories {
    /// Build repositories for the configured backend.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.is_memory() {
            tracing::warn!("Using the in-memory backend; data is lost on restart");
            return Ok(Self::in_memory());
        }

        let pool = create_pool(config).await?;
        Ok(Self::postgres(pool))
    }

    pub fn postgres(pool: DbPool) -> Self {
        Self {
            accounts: Arc::new(SqlxAccountRepository::new(pool.clone())),
            sessions: Arc::new(SqlxSessionRepository::new(pool.clone())),
            inventory: Arc::new(SqlxInventoryRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(MemoryAccountRepository::new()),
            sessions: Arc::new(MemorySessionRepository::new()),
            inventory: Arc::new(MemoryInventoryRepository::with_sample_data()),
            pool: None,
        }
    }

    /// Backend reachability for the health endpoint.
    pub async fn check(&self) -> Result<()> {
        match &self.pool {
            Some(pool) => check_connection(pool).await,
            None => Ok(()),
        }
    }
}
