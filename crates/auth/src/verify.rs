//! Request verification entry point.
//!
//! A controller hands over the request's two tokens and the policy its route
//! requires, and gets back a [`Verdict`]. Renewal of an expired access token
//! is returned as data ([`RenewedCredential`]); attaching it to the outgoing
//! response is the caller's job.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::codec::{DecodeFailure, SignError, TokenCodec};
use crate::config::{AuthConfig, ConfigError};
use crate::refresh::RefreshCoordinator;
use crate::{AuthPolicy, Denial, Role, TokenClaims, validate_claims};

/// Reason reported for an allowed request.
pub const SUCCESS: &str = "Success";

/// Advisory attached to a response that carries a renewed access token.
pub const RENEWAL_NOTICE: &str =
    "Access token has been refreshed. Copy the new access token into subsequent requests";

/// The two credentials presented with a request. Empty strings count as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenPair<'a> {
    pub access: Option<&'a str>,
    pub refresh: Option<&'a str>,
}

impl<'a> TokenPair<'a> {
    pub fn new(access: Option<&'a str>, refresh: Option<&'a str>) -> Self {
        Self { access, refresh }
    }

    fn present(&self) -> Option<(&'a str, &'a str)> {
        let access = self.access.filter(|t| !t.is_empty())?;
        let refresh = self.refresh.filter(|t| !t.is_empty())?;
        Some((access, refresh))
    }
}

/// Uniform `{allowed, reason}` answer returned to controllers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    allowed: bool,
    reason: String,
}

impl VerificationResult {
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Newly signed access token produced by the refresh path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewedCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub message: &'static str,
}

/// Outcome of verifying one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed {
        /// Claims the policy was evaluated against.
        identity: TokenClaims,
        /// Present only when the access token had expired and was reissued.
        renewed: Option<RenewedCredential>,
    },
    Denied(Denial),
}

impl Verdict {
    pub(crate) fn allowed(identity: TokenClaims) -> Self {
        Verdict::Allowed {
            identity,
            renewed: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed { .. })
    }

    pub fn result(&self) -> VerificationResult {
        match self {
            Verdict::Allowed { .. } => VerificationResult {
                allowed: true,
                reason: SUCCESS.to_string(),
            },
            Verdict::Denied(denial) => VerificationResult {
                allowed: false,
                reason: denial.to_string(),
            },
        }
    }

    pub fn identity(&self) -> Option<&TokenClaims> {
        match self {
            Verdict::Allowed { identity, .. } => Some(identity),
            Verdict::Denied(_) => None,
        }
    }

    pub fn renewed(&self) -> Option<&RenewedCredential> {
        match self {
            Verdict::Allowed { renewed, .. } => renewed.as_ref(),
            Verdict::Denied(_) => None,
        }
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Verdict::Denied(denial) => Some(denial),
            Verdict::Allowed { .. } => None,
        }
    }
}

/// Verification could not reach a verdict.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("{kind} token could not be verified: {detail}")]
    Decode { kind: &'static str, detail: String },

    #[error(transparent)]
    Sign(#[from] SignError),
}

/// Turn a decode failure into a denial carrying its label, or a fault.
pub(crate) fn reject(codec: &TokenCodec, failure: DecodeFailure) -> Result<Verdict, VerifyError> {
    match failure.label() {
        Some(label) => Ok(Verdict::Denied(Denial::Token(label))),
        None => {
            tracing::error!(kind = codec.kind(), error = %failure, "token verification fault");
            Err(VerifyError::Decode {
                kind: codec.kind(),
                detail: failure.to_string(),
            })
        }
    }
}

/// Access and refresh tokens minted together at sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access: String,
    pub refresh: String,
}

/// Verification facade holding the access and refresh codecs.
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Verifier {
    access: TokenCodec,
    refresh: TokenCodec,
}

impl Verifier {
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_codecs(
            TokenCodec::new(
                "access",
                config.access_secret.as_bytes(),
                config.access_ttl()?,
                config.leeway_secs,
            ),
            TokenCodec::new(
                "refresh",
                config.refresh_secret.as_bytes(),
                config.refresh_ttl()?,
                config.leeway_secs,
            ),
        ))
    }

    pub fn from_codecs(access: TokenCodec, refresh: TokenCodec) -> Self {
        Self { access, refresh }
    }

    pub fn access_codec(&self) -> &TokenCodec {
        &self.access
    }

    pub fn refresh_codec(&self) -> &TokenCodec {
        &self.refresh
    }

    /// Mint a fresh access/refresh pair for an identity that has just signed in.
    pub fn issue_pair(
        &self,
        username: &str,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedTokens, SignError> {
        let (access, _) = self.access.issue(username, email, role.clone(), now)?;
        let (refresh, _) = self.refresh.issue(username, email, role, now)?;
        Ok(IssuedTokens { access, refresh })
    }

    pub fn verify(&self, tokens: TokenPair<'_>, policy: &AuthPolicy) -> Result<Verdict, VerifyError> {
        self.verify_at(tokens, policy, Utc::now())
    }

    /// Verify with an explicit clock for any token issued on the refresh path.
    ///
    /// Expiry of the presented tokens is always judged against the system
    /// clock by the codec.
    pub fn verify_at(
        &self,
        tokens: TokenPair<'_>,
        policy: &AuthPolicy,
        now: DateTime<Utc>,
    ) -> Result<Verdict, VerifyError> {
        let verdict = self.decide(tokens, policy, now)?;

        match &verdict {
            Verdict::Denied(denial) => {
                tracing::debug!(policy = policy.kind(), reason = %denial, "request denied");
            }
            Verdict::Allowed {
                identity,
                renewed: Some(_),
            } => {
                tracing::info!(username = %identity.username, policy = policy.kind(), "access token renewed");
            }
            Verdict::Allowed { renewed: None, .. } => {}
        }

        Ok(verdict)
    }

    fn decide(
        &self,
        tokens: TokenPair<'_>,
        policy: &AuthPolicy,
        now: DateTime<Utc>,
    ) -> Result<Verdict, VerifyError> {
        let Some((access_token, refresh_token)) = tokens.present() else {
            return Ok(Verdict::Denied(Denial::Unauthorized));
        };

        let access = match self.access.decode(access_token) {
            Ok(claims) => claims,
            Err(DecodeFailure::Expired) => {
                return RefreshCoordinator::new(&self.access, &self.refresh).renew(refresh_token, policy, now);
            }
            Err(failure) => return reject(&self.access, failure),
        };

        let refresh = match self.refresh.decode(refresh_token) {
            Ok(claims) => claims,
            Err(DecodeFailure::Expired) => return Ok(Verdict::Denied(Denial::LoginRequired)),
            Err(failure) => return reject(&self.refresh, failure),
        };

        if validate_claims(&access).is_err() || validate_claims(&refresh).is_err() {
            return Ok(Verdict::Denied(Denial::MissingInformation));
        }

        // Both tokens must describe the same account, whatever the policy.
        if access.username != refresh.username {
            return Ok(Verdict::Denied(Denial::MismatchedUsers));
        }

        Ok(match policy.evaluate(&access) {
            Ok(()) => Verdict::allowed(access),
            Err(denial) => Verdict::Denied(denial),
        })
    }
}
