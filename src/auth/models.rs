//! Per-request identity.

use super::account::{AccountRole, AccountSnapshot};
use crate::domain::AccountId;

/// Who is making the current request. Inserted as a request extension by the
/// identity middleware; handlers read it and never change it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthContext {
    #[default]
    Anonymous,
    Authenticated(AccountSnapshot),
}

impl AuthContext {
    pub fn account(&self) -> Option<&AccountSnapshot> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::Authenticated(account) => Some(account),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated(_))
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account().map(|a| a.id)
    }

    pub fn role(&self) -> Option<AccountRole> {
        self.account().map(|a| a.role)
    }
}
