//! Renewal of an expired access token from a still-valid refresh token.

use chrono::{DateTime, Utc};

use crate::codec::{DecodeFailure, TokenCodec};
use crate::verify::{RENEWAL_NOTICE, RenewedCredential, Verdict, VerifyError, reject};
use crate::{AuthPolicy, Denial, validate_claims};

/// Runs the refresh path once the access token is known to have expired.
///
/// There is no live access identity to compare with, so the refresh token's
/// claims alone are validated and evaluated against the policy.
#[derive(Debug, Clone, Copy)]
pub struct RefreshCoordinator<'a> {
    access: &'a TokenCodec,
    refresh: &'a TokenCodec,
}

impl<'a> RefreshCoordinator<'a> {
    pub fn new(access: &'a TokenCodec, refresh: &'a TokenCodec) -> Self {
        Self { access, refresh }
    }

    /// Re-verify the refresh token and, if the policy allows its identity,
    /// sign a new access token issued at `now`.
    ///
    /// A policy denial is returned unchanged and no token is signed.
    pub fn renew(
        &self,
        refresh_token: &str,
        policy: &AuthPolicy,
        now: DateTime<Utc>,
    ) -> Result<Verdict, VerifyError> {
        let claims = match self.refresh.decode(refresh_token) {
            Ok(claims) => claims,
            Err(DecodeFailure::Expired) => return Ok(Verdict::Denied(Denial::LoginRequired)),
            Err(failure) => return reject(self.refresh, failure),
        };

        if validate_claims(&claims).is_err() {
            return Ok(Verdict::Denied(Denial::MissingInformation));
        }

        if let Err(denial) = policy.evaluate(&claims) {
            return Ok(Verdict::Denied(denial));
        }

        let (token, identity) = self
            .access
            .issue(&claims.username, &claims.email, claims.role.clone(), now)?;

        Ok(Verdict::Allowed {
            renewed: Some(RenewedCredential {
                token,
                expires_at: identity.expires_at,
                message: RENEWAL_NOTICE,
            }),
            identity,
        })
    }
}
