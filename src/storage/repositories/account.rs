//! Account repository
//!
//! Persistence for visitor and staff accounts. Email uniqueness ignores case
//! and is enforced by the `account_email_key` index, surfaced as
//! [`DealershipError::DuplicateEmail`].

use crate::auth::account::{Account, AccountRole, NewAccount, ProfileUpdate};
use crate::domain::AccountId;
use crate::errors::{DealershipError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone, FromRow)]
struct AccountRow {
    pub account_id: i32,
    pub account_firstname: String,
    pub account_lastname: String,
    pub account_email: String,
    pub account_password: String,
    pub account_type: String,
}

const ACCOUNT_COLUMNS: &str = "account_id, account_firstname, account_lastname, account_email, account_password, account_type::TEXT AS account_type";

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new `Client` account
    async fn create_account(&self, account: NewAccount) -> Result<Account>;

    /// Get an account by ID
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>>;

    /// Get an account by its (normalized) email
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Replace names and email, returning the updated row
    async fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> Result<Account>;

    /// Replace the stored password hash
    async fn update_password(&self, id: AccountId, password_hash: String) -> Result<()>;
}

/// Map a write failure, turning the email unique constraint into `DuplicateEmail`.
pub(crate) fn map_write_error(err: sqlx::Error, context: &str) -> DealershipError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return DealershipError::DuplicateEmail;
        }
    }
    DealershipError::database(err, context)
}

#[derive(Debug, Clone)]
pub struct SqlxAccountRepository {
    pool: DbPool,
}

impl SqlxAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: AccountRow) -> Result<Account> {
        let role = AccountRole::from_str(&row.account_type)
            .map_err(|e| DealershipError::internal(e.to_string()))?;

        Ok(Account::new(
            AccountId::new(row.account_id),
            row.account_firstname,
            row.account_lastname,
            row.account_email,
            role,
            row.account_password,
        ))
    }
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    #[instrument(skip(self, account), fields(account_email = %account.email), name = "db_create_account")]
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO account (account_firstname, account_lastname, account_email, account_password) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "Failed to create account"))?;

        Self::row_to_account(row)
    }

    #[instrument(skip(self), fields(account_id = %id), name = "db_get_account")]
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM account WHERE account_id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| DealershipError::database(err, "Failed to fetch account"))?;

        row.map(Self::row_to_account).transpose()
    }

    #[instrument(skip(self, email), name = "db_get_account_by_email")]
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM account WHERE LOWER(account_email) = LOWER($1)",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| DealershipError::database(err, "Failed to fetch account by email"))?;

        row.map(Self::row_to_account).transpose()
    }

    #[instrument(skip(self, update), fields(account_id = %id), name = "db_update_account_profile")]
    async fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> Result<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE account SET account_firstname = $1, account_lastname = $2, account_email = $3 \
             WHERE account_id = $4 RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "Failed to update account"))?;

        match row {
            Some(row) => Self::row_to_account(row),
            None => Err(DealershipError::not_found("Account", id)),
        }
    }

    #[instrument(skip(self, password_hash), fields(account_id = %id), name = "db_update_account_password")]
    async fn update_password(&self, id: AccountId, password_hash: String) -> Result<()> {
        let result =
            sqlx::query("UPDATE account SET account_password = $1 WHERE account_id = $2")
                .bind(&password_hash)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|err| DealershipError::database(err, "Failed to update password"))?;

        if result.rows_affected() == 0 {
            return Err(DealershipError::not_found("Account", id));
        }

        Ok(())
    }
}
