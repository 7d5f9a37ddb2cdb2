//! `spendbook-auth` — request authentication and authorization gate.
//!
//! Decides whether a request carrying an access/refresh token pair may pass
//! a route's [`AuthPolicy`], renewing an expired access token from a valid
//! refresh token. Pure decision logic: no HTTP, no storage.

pub mod claims;
pub mod codec;
pub mod config;
pub mod denial;
pub mod policy;
pub mod refresh;
pub mod roles;
pub mod verify;

pub use claims::{ExpiryOutOfRange, TokenClaims, TokenValidationError, validate_claims};
pub use codec::{DecodeFailure, SignError, TokenCodec};
pub use config::{AuthConfig, ConfigError};
pub use denial::Denial;
pub use policy::AuthPolicy;
pub use refresh::RefreshCoordinator;
pub use roles::Role;
pub use verify::{
    IssuedTokens, RENEWAL_NOTICE, RenewedCredential, SUCCESS, TokenPair, VerificationResult,
    Verdict, Verifier, VerifyError,
};
