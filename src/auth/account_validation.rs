//! Form payloads for the account pages and the rules applied to them.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::AccountId;
use crate::errors::{DealershipError, FieldError};

lazy_static! {
    // Email validation: basic RFC 5322 compliant pattern
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    )
    .expect("EMAIL_REGEX should be a valid regex pattern");
}

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Maximum password length to bound hashing cost
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_REGEX.is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email").with_message("A valid email is required.".into()))
    }
}

/// Validate password strength
/// Requirements:
/// - At least 12 characters, at most 128
/// - At least one uppercase letter, one lowercase letter and one digit
/// - At least one special character
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let chars = password.chars().count();
    let strong = (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&chars)
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_numeric())
        && password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if strong {
        Ok(())
    } else {
        Err(ValidationError::new("weak_password").with_message(
            "Password must be at least 12 characters and contain an uppercase letter, a number and a special character.".into(),
        ))
    }
}

fn validate_first_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(
            ValidationError::new("name_empty").with_message("Please provide a first name.".into())
        );
    }
    Ok(())
}

fn validate_last_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().chars().count() < 2 {
        return Err(
            ValidationError::new("name_too_short").with_message("Please provide a last name.".into())
        );
    }
    Ok(())
}

fn validate_login_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password_empty")
            .with_message("Please provide a password.".into()));
    }
    Ok(())
}

/// Registration form body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegistrationForm {
    #[serde(default)]
    #[validate(custom(function = "validate_first_name"))]
    pub account_firstname: String,
    #[serde(default)]
    #[validate(custom(function = "validate_last_name"))]
    pub account_lastname: String,
    #[serde(default)]
    #[validate(custom(function = "validate_email"))]
    pub account_email: String,
    #[serde(default)]
    #[validate(custom(function = "validate_password"))]
    pub account_password: String,
}

/// Login form body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(custom(function = "validate_email"))]
    pub account_email: String,
    #[serde(default)]
    #[validate(custom(function = "validate_login_password"))]
    pub account_password: String,
}

/// Profile edit form body. The target account comes from a hidden field.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AccountUpdateForm {
    pub account_id: AccountId,
    #[serde(default)]
    #[validate(custom(function = "validate_first_name"))]
    pub account_firstname: String,
    #[serde(default)]
    #[validate(custom(function = "validate_last_name"))]
    pub account_lastname: String,
    #[serde(default)]
    #[validate(custom(function = "validate_email"))]
    pub account_email: String,
}

/// Password change form body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordUpdateForm {
    pub account_id: AccountId,
    #[serde(default)]
    #[validate(custom(function = "validate_password"))]
    pub account_password: String,
}

/// Run a form's rules, returning field-level failures sorted by field name.
pub fn check<T: Validate>(form: &T) -> Result<(), DealershipError> {
    form.validate().map_err(DealershipError::from)
}

/// Field errors of a failed [`check`], empty for any other error.
pub fn field_errors(error: &DealershipError) -> Vec<FieldError> {
    error.field_errors().to_vec()
}
