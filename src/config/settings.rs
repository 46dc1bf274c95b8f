//! # Configuration Settings
//!
//! Defines the configuration structure for the dealership application.

use crate::errors::{DealershipError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Minimum token secret length outside local development
const MIN_TOKEN_SECRET_LEN: usize = 32;

/// Built-in signing secret. Only accepted in local development.
pub const DEVELOPMENT_TOKEN_SECRET: &str = "dealership-development-secret-change-me-in-production";

/// Runtime environment. Only local development relaxes cookie security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Parse the environment name used by `NODE_ENV`-style variables.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn is_local_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        !self.is_local_development()
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Runtime environment
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Identity token configuration
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Server-side session configuration
    #[validate(nested)]
    pub session: SessionConfig,

    /// Logging and metrics configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from defaults and the process environment.
    ///
    /// Keys use the `DEALERSHIP__` prefix with `__` separating sections, e.g.
    /// `DEALERSHIP__SERVER__PORT=8080`. The plain variables `DATABASE_URL`,
    /// `PORT`, `ACCESS_TOKEN_SECRET` and `NODE_ENV` override their sections.
    pub fn load() -> Result<Self> {
        let defaults = config::Config::try_from(&AppConfig::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::Environment::with_prefix("DEALERSHIP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option(
                "server.port",
                std::env::var("PORT").ok().and_then(|p| p.parse::<i64>().ok()),
            )?
            .set_override_option("auth.token_secret", std::env::var("ACCESS_TOKEN_SECRET").ok())?
            .set_override_option(
                "environment",
                std::env::var("NODE_ENV")
                    .ok()
                    .map(|name| match Environment::from_name(&name) {
                        Environment::Development => "development".to_string(),
                        Environment::Production => "production".to_string(),
                    }),
            )?
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(DealershipError::from)?;
        self.validate_custom()?;
        Ok(())
    }

    fn validate_custom(&self) -> Result<()> {
        if !self.database.is_postgresql() && !self.database.is_memory() {
            return Err(DealershipError::validation(
                "Database URL must start with 'postgres://', 'postgresql://' or 'memory://'",
            ));
        }

        if !self.environment.is_local_development() {
            if self.auth.token_secret == DEVELOPMENT_TOKEN_SECRET {
                return Err(DealershipError::validation(
                    "ACCESS_TOKEN_SECRET must be set outside development",
                ));
            }
            if self.auth.token_secret.len() < MIN_TOKEN_SECRET_LEN {
                return Err(DealershipError::validation(format!(
                    "Token secret must be at least {} characters long outside development",
                    MIN_TOKEN_SECRET_LEN
                )));
            }
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(DealershipError::validation(
                "min_connections cannot be greater than max_connections",
            ));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Directory served for static assets (css, js, images)
    #[validate(length(min = 1, message = "Public directory cannot be empty"))]
    pub public_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 3000, public_dir: "public".to_string() }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL (`postgresql://...` or `memory://`)
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(max = 50, message = "Min connections must be between 0 and 50"))]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Run embedded migrations when the pool is created
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost:5432/dealership".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    /// Check if this is a PostgreSQL configuration
    pub fn is_postgresql(&self) -> bool {
        self.url.starts_with("postgresql://") || self.url.starts_with("postgres://")
    }

    /// Check if this selects the ephemeral in-memory backend
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory://")
    }
}

/// Identity token configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// HMAC secret used to sign identity tokens
    #[validate(length(min = 1, message = "Token secret cannot be empty"))]
    pub token_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { token_secret: DEVELOPMENT_TOKEN_SECRET.to_string() }
    }
}

/// Server-side session configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionConfig {
    /// Session record lifetime in seconds
    #[validate(range(
        min = 60,
        max = 2_592_000,
        message = "Session TTL must be between 1 minute and 30 days"
    ))]
    pub ttl_seconds: u64,

    /// Interval between expired-session sweeps in seconds (0 = disabled)
    pub cleanup_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_seconds: 86_400, cleanup_interval_seconds: 900 }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn cleanup_interval(&self) -> Option<Duration> {
        if self.cleanup_interval_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.cleanup_interval_seconds))
        }
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Expose Prometheus metrics at `/metrics`
    pub enable_metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false, enable_metrics: false }
    }
}
