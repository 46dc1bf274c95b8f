//! Account use-cases: register, login, profile and password updates, logout.
//!
//! Each use-case composes the credential store, the token issuer and the
//! authorization gate. Responses (cookies, flashes, redirects) are the web
//! layer's job; this service only decides outcomes.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::auth::account::{Account, AccountSnapshot};
use crate::auth::account_validation::{
    check, AccountUpdateForm, LoginForm, PasswordUpdateForm, RegistrationForm,
};
use crate::auth::authorization;
use crate::auth::credential_store::CredentialStore;
use crate::auth::jwt::{IssuedToken, TokenIssuer};
use crate::auth::models::AuthContext;
use crate::auth::session::{FlashKind, Session};
use crate::errors::{Error, Result};
use crate::observability::metrics;

/// Result of a successful profile edit.
#[derive(Debug, Clone)]
pub struct ProfileUpdated {
    pub account: AccountSnapshot,
    /// Replacement token, present only when callers edited their own account
    pub reissued: Option<IssuedToken>,
}

#[derive(Clone)]
pub struct AccountService {
    credentials: CredentialStore,
    tokens: Arc<TokenIssuer>,
}

impl AccountService {
    pub fn new(credentials: CredentialStore, tokens: Arc<TokenIssuer>) -> Self {
        Self { credentials, tokens }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Validate the form and create a `Client` account.
    #[instrument(skip(self, form))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<Account> {
        if let Err(e) = check(form) {
            metrics::record_registration("invalid_input").await;
            return Err(e);
        }

        match self
            .credentials
            .register(
                &form.account_firstname,
                &form.account_lastname,
                &form.account_email,
                &form.account_password,
            )
            .await
        {
            Ok(account) => {
                metrics::record_registration("success").await;
                Ok(account)
            }
            Err(e) => {
                let status = if matches!(e, Error::DuplicateEmail) { "duplicate" } else { "error" };
                metrics::record_registration(status).await;
                Err(e)
            }
        }
    }

    /// Verify credentials and sign a token for the account.
    #[instrument(skip(self, form))]
    pub async fn login(&self, form: &LoginForm) -> Result<(AccountSnapshot, IssuedToken)> {
        if let Err(e) = check(form) {
            metrics::record_authentication("invalid_input").await;
            return Err(e);
        }

        let account =
            match self.credentials.verify(&form.account_email, &form.account_password).await {
                Ok(account) => account,
                Err(e @ Error::Auth { .. }) => {
                    metrics::record_authentication("invalid_credentials").await;
                    return Err(e);
                }
                Err(e) => {
                    metrics::record_authentication("error").await;
                    return Err(e);
                }
            };

        let token = self.tokens.issue(&account)?;
        metrics::record_authentication("success").await;
        metrics::record_token_issued("login").await;
        info!(account_id = %account.id, "account logged in");

        Ok((account, token))
    }

    /// Edit the names and email of the account named in the form.
    ///
    /// Callers may edit their own account; admins may edit any. The token is
    /// re-issued only for self-edits so an admin keeps their own identity.
    #[instrument(skip(self, context, form), fields(target_account_id = %form.account_id))]
    pub async fn update_account(
        &self,
        context: &AuthContext,
        form: &AccountUpdateForm,
    ) -> Result<ProfileUpdated> {
        let caller = authorization::require_owner_or_admin(context, form.account_id)?;
        check(form)?;

        let updated = self
            .credentials
            .update_profile(
                form.account_id,
                &form.account_firstname,
                &form.account_lastname,
                &form.account_email,
            )
            .await?;

        let account = updated.snapshot();
        let reissued = if caller.id == account.id {
            let token = self.tokens.issue(&account)?;
            metrics::record_token_issued("profile_update").await;
            Some(token)
        } else {
            info!(admin_id = %caller.id, account_id = %account.id, "account updated by admin");
            None
        };

        Ok(ProfileUpdated { account, reissued })
    }

    /// Replace the password of the account named in the form.
    #[instrument(skip(self, context, form), fields(target_account_id = %form.account_id))]
    pub async fn update_password(
        &self,
        context: &AuthContext,
        form: &PasswordUpdateForm,
    ) -> Result<()> {
        authorization::require_owner_or_admin(context, form.account_id)?;
        check(form)?;

        self.credentials.update_password(form.account_id, &form.account_password).await?;
        info!(account_id = %form.account_id, "password updated");
        Ok(())
    }

    /// End the server-side session and continue in a fresh one carrying the
    /// logout notice. Clearing the token cookie is up to the caller.
    pub fn logout(&self, context: &AuthContext, session: &Session) {
        match context.account_id() {
            Some(id) => info!(account_id = %id, "account logged out"),
            None => warn!("logout requested without an identity"),
        }
        session.regenerate();
        session.flash(FlashKind::Info, "You have been logged out.");
    }
}
