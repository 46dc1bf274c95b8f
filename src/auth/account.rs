//! Account domain models and data structures.
//!
//! [`Account`] is the stored row including the password hash and never leaves
//! the credential store boundary in that form. [`AccountSnapshot`] is the
//! hash-free projection embedded in identity tokens and handed to views.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::AccountId;

/// Account role stored in `account.account_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AccountRole {
    #[default]
    Client,
    Employee,
    Admin,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Client => "Client",
            AccountRole::Employee => "Employee",
            AccountRole::Admin => "Admin",
        }
    }

    /// Employees and admins may manage inventory.
    pub fn is_elevated(&self) -> bool {
        matches!(self, AccountRole::Employee | AccountRole::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AccountRole::Admin)
    }
}

impl Display for AccountRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = AccountRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Client" => Ok(AccountRole::Client),
            "Employee" => Ok(AccountRole::Employee),
            "Admin" => Ok(AccountRole::Admin),
            other => Err(AccountRoleParseError(other.to_string())),
        }
    }
}

/// Error returned when account role parsing fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid account type: {0}")]
pub struct AccountRoleParseError(pub String);

/// Stored representation of an account, password hash included.
#[derive(Clone)]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: AccountRole,
    pub(crate) password_hash: String,
}

impl Account {
    pub fn new(
        id: AccountId,
        first_name: String,
        last_name: String,
        email: String,
        role: AccountRole,
        password_hash: String,
    ) -> Self {
        Self { id, first_name, last_name, email, role, password_hash }
    }

    /// Hash-free copy suitable for tokens and views.
    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    /// Normalize email for consistent storage and comparison.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

impl Debug for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Account fields embedded in identity tokens. Carries no password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(rename = "account_id")]
    pub id: AccountId,
    #[serde(rename = "account_firstname")]
    pub first_name: String,
    #[serde(rename = "account_lastname")]
    pub last_name: String,
    #[serde(rename = "account_email")]
    pub email: String,
    #[serde(rename = "account_type")]
    pub role: AccountRole,
}

/// New account creation payload; the hash is computed by the credential store.
#[derive(Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Mutable profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
