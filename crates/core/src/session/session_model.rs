use serde::{Deserialize, Serialize};

use crate::constants::MIN_PASSWORD_LEN;
use crate::errors::{Result, ValidationError};

/// Authenticated user record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Successful login/register payload: the user plus an opaque bearer token.
///
/// Token and user travel together here and are persisted together; no code
/// path stores one without the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Registration form input, validated client-side before any network call.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub name: String,
}

impl Registration {
    /// Validate the registration form. Failures are reported per-field and
    /// never reach the network.
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        if self.password_confirm.is_empty() {
            return Err(ValidationError::MissingField("confirmPassword").into());
        }
        if self.password != self.password_confirm {
            return Err(ValidationError::PasswordMismatch.into());
        }
        Ok(())
    }
}

/// Result of the auth subsystem status probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
}

lazy_static::lazy_static! {
    static ref EMAIL_RE: regex::Regex =
        regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern");
}

/// Check that an email is present and has a plausible shape.
pub fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(ValidationError::MissingField("email").into());
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail.into());
    }
    Ok(())
}
