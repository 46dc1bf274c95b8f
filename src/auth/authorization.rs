//! Authorization gate.
//!
//! Pure checks over an [`AuthContext`]. They never touch cookies or tokens;
//! the middleware and handlers turn a failure into a redirect and flash.

use crate::auth::account::AccountSnapshot;
use crate::auth::models::AuthContext;
use crate::domain::AccountId;
use crate::errors::{AuthErrorType, Error, Result};

/// Login page anonymous callers are sent to.
pub const LOGIN_PATH: &str = "/account/login";

/// Edit page for `account_id`, where owner mismatches are redirected.
pub fn account_update_path(account_id: AccountId) -> String {
    format!("/account/update/{}", account_id)
}

/// Require a verified identity.
///
/// ```rust
/// use dealership::auth::authorization::require_authenticated;
/// use dealership::auth::models::AuthContext;
///
/// assert!(require_authenticated(&AuthContext::Anonymous).is_err());
/// ```
pub fn require_authenticated(context: &AuthContext) -> Result<&AccountSnapshot> {
    context
        .account()
        .ok_or_else(|| Error::auth("Please log in.", AuthErrorType::MissingToken))
}

/// Allow the owner of `resource_account_id`, or any admin.
///
/// On mismatch the error redirects to the caller's own edit page.
pub fn require_owner_or_admin(
    context: &AuthContext,
    resource_account_id: AccountId,
) -> Result<&AccountSnapshot> {
    let account = require_authenticated(context)?;

    if account.id == resource_account_id || account.role.is_admin() {
        return Ok(account);
    }

    tracing::warn!(
        account_id = %account.id,
        target_account_id = %resource_account_id,
        "account edit denied for non-owner"
    );
    Err(Error::authorization(
        "You can only update your own account.",
        account_update_path(account.id),
    ))
}

/// Allow employees and admins.
pub fn require_elevated_role(context: &AuthContext) -> Result<&AccountSnapshot> {
    let account = require_authenticated(context)?;

    if account.role.is_elevated() {
        return Ok(account);
    }

    Err(Error::auth(
        "You do not have permission to access that page.",
        AuthErrorType::InsufficientPermissions,
    ))
}
