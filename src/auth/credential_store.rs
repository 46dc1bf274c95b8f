//! Credential store: password hashing plus account persistence.
//!
//! Password hashes never leave this module; [`CredentialStore::verify`] hands
//! back an [`AccountSnapshot`] which has no hash field.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::auth::account::{Account, AccountSnapshot, NewAccount, ProfileUpdate};
use crate::auth::hashing::{self, DUMMY_HASH};
use crate::domain::AccountId;
use crate::errors::{AuthErrorType, Error, Result};
use crate::storage::repositories::{AccountRepository, SqlxAccountRepository};

/// Uniform message for every failed credential check.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

#[derive(Clone)]
pub struct CredentialStore {
    repository: Arc<dyn AccountRepository>,
}

impl CredentialStore {
    pub fn new(repository: Arc<dyn AccountRepository>) -> Self {
        Self { repository }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool) -> Self {
        Self::new(Arc::new(SqlxAccountRepository::new(pool)))
    }

    /// Hash the password and insert a `Client` account.
    ///
    /// Fails with [`Error::DuplicateEmail`] when the email is taken.
    #[instrument(skip(self, first_name, last_name, email, plain_password))]
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        plain_password: &str,
    ) -> Result<Account> {
        let password_hash = hashing::hash_password(plain_password)?;
        let account = self
            .repository
            .create_account(NewAccount {
                first_name: first_name.trim().to_string(),
                last_name: last_name.trim().to_string(),
                email: Account::normalize_email(email),
                password_hash,
            })
            .await?;

        info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Check an email/password pair.
    ///
    /// Unknown emails and wrong passwords fail identically, and an unknown
    /// email still pays for one hash verification.
    #[instrument(skip(self, email, plain_password))]
    pub async fn verify(&self, email: &str, plain_password: &str) -> Result<AccountSnapshot> {
        let email = Account::normalize_email(email);

        let account = match self.repository.get_account_by_email(&email).await? {
            Some(account) => account,
            None => {
                if let Err(e) = hashing::verify_password(plain_password, &DUMMY_HASH) {
                    warn!(error = %e, "dummy hash verification failed unexpectedly");
                }
                return Err(invalid_credentials());
            }
        };

        if !hashing::verify_password(plain_password, &account.password_hash)? {
            warn!(account_id = %account.id, "login attempt with incorrect password");
            return Err(invalid_credentials());
        }

        Ok(account.snapshot())
    }

    /// Replace names and email of an existing account.
    #[instrument(skip(self, first_name, last_name, email), fields(account_id = %account_id))]
    pub async fn update_profile(
        &self,
        account_id: AccountId,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<Account> {
        let update = ProfileUpdate {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: Account::normalize_email(email),
        };
        self.repository.update_profile(account_id, update).await
    }

    /// Re-hash and store a new password.
    #[instrument(skip(self, plain_password), fields(account_id = %account_id))]
    pub async fn update_password(&self, account_id: AccountId, plain_password: &str) -> Result<()> {
        let password_hash = hashing::hash_password(plain_password)?;
        self.repository.update_password(account_id, password_hash).await
    }

    /// Look up an account for display.
    pub async fn find(&self, account_id: AccountId) -> Result<AccountSnapshot> {
        self.repository
            .get_account(account_id)
            .await?
            .map(|account| account.snapshot())
            .ok_or_else(|| Error::not_found("Account", account_id))
    }
}

fn invalid_credentials() -> Error {
    Error::auth(INVALID_CREDENTIALS_MESSAGE, AuthErrorType::InvalidCredentials)
}
