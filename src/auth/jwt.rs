//! Identity token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying an [`AccountSnapshot`] and a fixed one hour
//! lifetime. They travel in the `jwt` cookie built by [`token_cookie`].

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use super::account::AccountSnapshot;
use crate::config::AuthConfig;
use crate::errors::{DealershipError, Result};

/// Token lifetime in seconds
pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// Cookie carrying the identity token
pub const TOKEN_COOKIE_NAME: &str = "jwt";

/// Stale cookie left behind by the pre-login email prompt
pub const PRE_LOGIN_COOKIE_NAME: &str = "account_email";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // account id
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub account: AccountSnapshot,
}

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Why a presented token was rejected. Callers treat all of them as anonymous.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is malformed")]
    Malformed,
}

/// Signs and verifies identity tokens with the server-held secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("algorithm", &Algorithm::HS256).finish()
    }
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self::from_secret(config.token_secret.as_bytes())
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for `account` valid from now.
    pub fn issue(&self, account: &AccountSnapshot) -> Result<IssuedToken> {
        self.issue_at(account, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`.
    #[instrument(skip(self, account), fields(account_id = %account.id))]
    pub fn issue_at(
        &self,
        account: &AccountSnapshot,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken> {
        let expires_at = issued_at + Duration::seconds(TOKEN_TTL_SECONDS);
        let claims = Claims {
            sub: account.id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            account: account.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DealershipError::internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and lifetime, returning the embedded account.
    pub fn verify(&self, token: &str) -> std::result::Result<AccountSnapshot, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed,
            }
        })?;

        if data.claims.sub != data.claims.account.id.to_string() {
            return Err(TokenError::Malformed);
        }

        Ok(data.claims.account)
    }
}

/// Build the `jwt` cookie for a freshly issued token.
pub fn token_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(TOKEN_TTL_SECONDS))
        .into()
}

/// A cookie that, when removed from a jar, clears the named cookie at `/`.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").into()
}
