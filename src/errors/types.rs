//! # Error Types
//!
//! Error taxonomy for the dealership application using `thiserror`.

use std::fmt;

/// Custom result type for dealership operations
pub type Result<T> = std::result::Result<T, DealershipError>;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Main error type for the dealership application
#[derive(thiserror::Error, Debug)]
pub enum DealershipError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Rejected input
    #[error("Validation error: {message}")]
    Validation { message: String, errors: Vec<FieldError> },

    /// Registration or profile update reused an email that already exists
    #[error("Account email is already registered")]
    DuplicateEmail,

    /// Authentication errors
    #[error("Authentication error: {message}")]
    Auth { message: String, error_type: AuthErrorType },

    /// Owner or role mismatch. `redirect_to` points at a resource the caller owns.
    #[error("Authorization error: {message}")]
    Authorization { message: String, redirect_to: String },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID '{id}'")]
    NotFound { resource_type: String, id: String },

    /// View rendering errors
    #[error("Template error: {context}")]
    Template {
        #[source]
        source: minijinja::Error,
        context: String,
    },

    /// Internal server errors
    #[error("Internal server error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Authentication error subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorType {
    InvalidCredentials,
    MissingToken,
    InvalidToken,
    ExpiredToken,
    InsufficientPermissions,
}

impl fmt::Display for AuthErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorType::InvalidCredentials => write!(f, "invalid_credentials"),
            AuthErrorType::MissingToken => write!(f, "missing_token"),
            AuthErrorType::InvalidToken => write!(f, "invalid_token"),
            AuthErrorType::ExpiredToken => write!(f, "expired_token"),
            AuthErrorType::InsufficientPermissions => write!(f, "insufficient_permissions"),
        }
    }
}

impl DealershipError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a database error with context
    pub fn database<S: Into<String>>(source: sqlx::Error, context: S) -> Self {
        Self::Database { source, context: context.into() }
    }

    /// Create a validation error without field details
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), errors: Vec::new() }
    }

    /// Create a validation error from field-level failures
    pub fn validation_fields(errors: Vec<FieldError>) -> Self {
        let message = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation { message, errors }
    }

    /// Create an authentication error
    pub fn auth<S: Into<String>>(message: S, error_type: AuthErrorType) -> Self {
        Self::Auth { message: message.into(), error_type }
    }

    /// Create an authorization error that sends the caller back to `redirect_to`
    pub fn authorization<S: Into<String>, R: Into<String>>(message: S, redirect_to: R) -> Self {
        Self::Authorization { message: message.into(), redirect_to: redirect_to.into() }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: ToString>(resource_type: R, id: I) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.to_string() }
    }

    /// Create an internal server error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Field-level failures carried by a validation error
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            DealershipError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Get the HTTP status code that should be returned for this error
    pub fn status_code(&self) -> u16 {
        match self {
            DealershipError::Config { .. } => 500,
            DealershipError::Database { .. } => 500,
            DealershipError::Io { .. } => 500,
            DealershipError::Serialization { .. } => 400,
            DealershipError::Validation { .. } => 400,
            DealershipError::DuplicateEmail => 409,
            DealershipError::Auth { .. } => 401,
            DealershipError::Authorization { .. } => 403,
            DealershipError::NotFound { .. } => 404,
            DealershipError::Template { .. } => 500,
            DealershipError::Internal { .. } => 500,
        }
    }
}

// Error conversions for common external error types
impl From<sqlx::Error> for DealershipError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<std::io::Error> for DealershipError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for DealershipError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<minijinja::Error> for DealershipError {
    fn from(error: minijinja::Error) -> Self {
        Self::Template { source: error, context: "View rendering failed".to_string() }
    }
}

impl From<config::ConfigError> for DealershipError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for DealershipError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map_or_else(|| "Invalid value".to_string(), |m| m.to_string());
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        Self::validation_fields(fields)
    }
}
