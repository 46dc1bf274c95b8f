//! Authentication and authorization.
//!
//! Credential storage and hashing, identity tokens, the authorization gate,
//! server-side sessions and the account use-cases built on them.

pub mod account;
pub mod account_service;
pub mod account_validation;
pub mod authorization;
pub mod cleanup_service;
pub mod credential_store;
mod hashing;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod session;

pub use account::{Account, AccountRole, AccountSnapshot};
pub use account_service::{AccountService, ProfileUpdated};
pub use credential_store::CredentialStore;
pub use jwt::{IssuedToken, TokenError, TokenIssuer};
pub use models::AuthContext;
pub use session::{FlashKind, FlashMessage, Session, SessionStore};
