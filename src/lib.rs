//! # Dealership
//!
//! A server-rendered car dealership site: vehicle browsing by classification,
//! account registration and login, and account management.
//!
//! ## Architecture
//!
//! ```text
//! axum router → session / identity middleware → handlers → views
//!                                   ↓
//!     credential store · token issuer · authorization gate
//!                                   ↓
//!                 repositories (PostgreSQL or in-memory)
//! ```
//!
//! Identity travels in a signed, HttpOnly `jwt` cookie and is verified once
//! per request into an [`auth::models::AuthContext`]. Flash messages live in a
//! server-side session record keyed by the `sessionId` cookie.

pub mod auth;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;
pub mod web;

pub use config::{AppConfig, Environment};
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
