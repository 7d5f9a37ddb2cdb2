use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Decoded payload of an access or refresh token.
///
/// Identity fields default to empty when absent from the payload so that a
/// structurally valid but incomplete token reaches [`validate_claims`]
/// instead of failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account's username.
    #[serde(rename = "sub", default)]
    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub role: Role,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl TokenClaims {
    /// Claims for a token issued at `now` and valid for `ttl`.
    pub fn issue(
        username: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, ExpiryOutOfRange> {
        let expires_at = now.checked_add_signed(ttl).ok_or(ExpiryOutOfRange)?;
        Ok(Self {
            username: username.into(),
            email: email.into(),
            role,
            issued_at: now,
            expires_at,
        })
    }
}

/// `now + ttl` does not fit in a timestamp.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("token expiry is out of range")]
pub struct ExpiryOutOfRange;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has no subject")]
    MissingSubject,

    #[error("token has no email")]
    MissingEmail,

    #[error("token has no role")]
    MissingRole,
}

/// Check that a claim set names a subject, an email and a role.
///
/// Signature and expiry are the codec's concern; this only looks at the
/// identity fields.
pub fn validate_claims(claims: &TokenClaims) -> Result<(), TokenValidationError> {
    if claims.username.is_empty() {
        return Err(TokenValidationError::MissingSubject);
    }
    if claims.email.is_empty() {
        return Err(TokenValidationError::MissingEmail);
    }
    if claims.role.is_empty() {
        return Err(TokenValidationError::MissingRole);
    }
    Ok(())
}
