//! # Configuration Management
//!
//! Immutable application configuration, built once at process start and handed
//! to each component's constructor.

pub mod settings;

pub use settings::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, ObservabilityConfig, ServerConfig,
    SessionConfig,
};
