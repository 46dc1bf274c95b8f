//! # Database Connection Pool Management
//!
//! Provides PostgreSQL connection pool creation and management utilities.

use crate::config::DatabaseConfig;
use crate::errors::{DealershipError, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Type alias for the database connection pool
pub type DbPool = PgPool;

/// Create a database connection pool with the specified configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    validate_config(config)?;

    let pool_options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout())
        .test_before_acquire(true);

    let pool_options = if let Some(idle_timeout) = config.idle_timeout() {
        pool_options.idle_timeout(idle_timeout)
    } else {
        pool_options
    };

    let pool = pool_options.connect(&config.url).await.map_err(|e| {
        tracing::error!(error = %e, url = %sanitize_url(&config.url), "Failed to create database pool");
        DealershipError::Database {
            source: e,
            context: format!("Failed to connect to database: {}", sanitize_url(&config.url)),
        }
    })?;

    tracing::info!(
        database_type = "postgresql",
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connect_timeout_ms = config.connect_timeout().as_millis(),
        idle_timeout_ms = config.idle_timeout().map(|d| d.as_millis()),
        "Database connection pool created"
    );

    if config.auto_migrate {
        tracing::info!("Auto-migration enabled, running database migrations");
        crate::storage::migrations::run_migrations(&pool).await?;
    }

    Ok(pool)
}

/// Validate database configuration
fn validate_config(config: &DatabaseConfig) -> Result<()> {
    if config.max_connections == 0 {
        return Err(DealershipError::validation("max_connections must be greater than 0"));
    }

    if config.min_connections > config.max_connections {
        return Err(DealershipError::validation(
            "min_connections cannot be greater than max_connections",
        ));
    }

    if config.url.is_empty() {
        return Err(DealershipError::validation("database URL cannot be empty"));
    }

    if !config.is_postgresql() {
        return Err(DealershipError::validation(
            "database URL must start with 'postgres://' or 'postgresql://'",
        ));
    }

    Ok(())
}

/// Sanitize database URL for logging (remove credentials)
pub fn sanitize_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) if parsed.password().is_some() || !parsed.username().is_empty() => {
            let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
            format!(
                "{}://***:***@{}{}{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or("unknown"),
                port,
                parsed.path()
            )
        }
        _ => url.to_string(),
    }
}

/// Get pool statistics for monitoring
pub fn get_pool_stats(pool: &DbPool) -> PoolStats {
    PoolStats { size: pool.size(), idle: pool.num_idle() }
}

/// Pool statistics for monitoring
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Total connections in the pool
    pub size: u32,
    /// Number of idle connections
    pub idle: usize,
}

impl PoolStats {
    /// Get the number of active connections
    pub fn active(&self) -> u32 {
        self.size.saturating_sub(self.idle as u32)
    }
}
