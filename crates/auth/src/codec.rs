//! Signed token encoding and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::claims::ExpiryOutOfRange;
use crate::{Role, TokenClaims};

/// Why a token could not be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    /// Signature is valid but `exp` is in the past.
    #[error("ExpiredSignature")]
    Expired,

    /// The token is malformed, forged or fails a claim check. `label` names
    /// the verification failure and is reported to callers as-is.
    #[error("{label}")]
    Rejected { label: &'static str },

    /// Verification broke down for a reason unrelated to the token itself
    /// (key material, crypto backend).
    #[error("token verification fault: {0}")]
    Fault(String),
}

impl DecodeFailure {
    /// Observable label of a token failure; `None` for faults.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            DecodeFailure::Expired => Some("ExpiredSignature"),
            DecodeFailure::Rejected { label } => Some(*label),
            DecodeFailure::Fault(_) => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for DecodeFailure {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        let label = match err.kind() {
            ErrorKind::ExpiredSignature => return DecodeFailure::Expired,
            ErrorKind::InvalidToken => "InvalidToken",
            ErrorKind::InvalidSignature => "InvalidSignature",
            ErrorKind::InvalidAlgorithm => "InvalidAlgorithm",
            ErrorKind::MissingAlgorithm => "MissingAlgorithm",
            ErrorKind::MissingRequiredClaim(_) => "MissingRequiredClaim",
            ErrorKind::ImmatureSignature => "ImmatureSignature",
            ErrorKind::InvalidIssuer => "InvalidIssuer",
            ErrorKind::InvalidAudience => "InvalidAudience",
            ErrorKind::InvalidSubject => "InvalidSubject",
            ErrorKind::Base64(_) => "Base64",
            ErrorKind::Json(_) => "Json",
            ErrorKind::Utf8(_) => "Utf8",
            _ => return DecodeFailure::Fault(err.to_string()),
        };
        DecodeFailure::Rejected { label }
    }
}

#[derive(Debug, Error)]
pub enum SignError {
    #[error("failed to sign {kind} token: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    #[error("{kind} token: {source}")]
    Expiry {
        kind: &'static str,
        #[source]
        source: ExpiryOutOfRange,
    },
}

/// HS256 codec bound to one secret and one token lifetime.
///
/// Access and refresh tokens each get their own codec, so a token signed for
/// one purpose never verifies as the other.
#[derive(Clone)]
pub struct TokenCodec {
    kind: &'static str,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(kind: &'static str, secret: &[u8], ttl: Duration, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.validate_aud = false;

        Self {
            kind,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Token purpose this codec was built for (`"access"` / `"refresh"`).
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Verify signature and expiry, then return the claims.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, DecodeFailure> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(DecodeFailure::from)
    }

    pub fn sign(&self, claims: &TokenClaims) -> Result<String, SignError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|source| {
            SignError::Encode {
                kind: self.kind,
                source,
            }
        })
    }

    /// Sign a fresh token for an identity, valid for this codec's lifetime from `now`.
    pub fn issue(
        &self,
        username: &str,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<(String, TokenClaims), SignError> {
        let claims = TokenClaims::issue(username, email, role, now, self.ttl)
            .map_err(|source| SignError::Expiry { kind: self.kind, source })?;
        let token = self.sign(&claims)?;
        Ok((token, claims))
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("kind", &self.kind)
            .field("ttl_secs", &self.ttl.num_seconds())
            .field("leeway_secs", &self.validation.leeway)
            .finish()
    }
}
