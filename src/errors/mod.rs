//! # Error Handling
//!
//! Error types shared by every layer of the dealership application.

pub mod types;

pub use types::{AuthErrorType, DealershipError, FieldError, Result};

/// Short alias used across the crate.
pub type Error = DealershipError;
