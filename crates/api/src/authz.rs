//! API-side authorization guard.
//!
//! Handlers call [`authorize_request`] before doing any work. A denial is
//! turned into the matching error response; an allowed request yields a
//! [`Granted`] that must be used to build the success response so a renewed
//! access token reaches the client.

use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use spendbook_auth::{AuthPolicy, RenewedCredential, TokenClaims, TokenPair, Verdict, Verifier};

use crate::app::errors;
use crate::context::{ACCESS_COOKIE, RENEWED_ACCESS_HEADER, RequestCredentials, Transport};

/// Body field carrying the renewal advisory.
pub const REFRESH_NOTICE_FIELD: &str = "refreshNotice";

/// An allowed request, plus any credential renewal to hand back.
#[derive(Debug)]
pub struct Granted {
    identity: TokenClaims,
    renewed: Option<RenewedCredential>,
    transport: Transport,
}

impl Granted {
    pub fn identity(&self) -> &TokenClaims {
        &self.identity
    }

    pub fn renewed(&self) -> Option<&RenewedCredential> {
        self.renewed.as_ref()
    }

    /// Build the success response, attaching a renewed access token if any.
    pub fn respond(self, status: StatusCode, mut body: serde_json::Value) -> Response {
        let Some(renewed) = self.renewed else {
            return (status, Json(body)).into_response();
        };

        if let Some(object) = body.as_object_mut() {
            object.insert(REFRESH_NOTICE_FIELD.to_string(), renewed.message.into());
        }

        let (name, value) = match renewal_header(&renewed, self.transport) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "renewed token is not a valid header value");
                return errors::internal_error();
            }
        };

        let mut response = (status, Json(body)).into_response();
        response.headers_mut().insert(name, value);
        response
    }
}

fn renewal_header(
    renewed: &RenewedCredential,
    transport: Transport,
) -> Result<(HeaderName, HeaderValue), axum::http::header::InvalidHeaderValue> {
    match transport {
        Transport::Header => Ok((
            HeaderName::from_static(RENEWED_ACCESS_HEADER),
            HeaderValue::from_str(&renewed.token)?,
        )),
        Transport::Cookie => {
            let max_age = (renewed.expires_at - Utc::now()).num_seconds().max(0);
            let cookie = format!(
                "{ACCESS_COOKIE}={}; HttpOnly; Path=/; SameSite=Strict; Max-Age={max_age}",
                renewed.token
            );
            Ok((header::SET_COOKIE, HeaderValue::from_str(&cookie)?))
        }
    }
}

/// Run the request gate for `policy`.
///
/// Returns the ready-made error response on denial or verification fault.
pub fn authorize_request(
    verifier: &Verifier,
    credentials: &RequestCredentials,
    policy: &AuthPolicy,
) -> Result<Granted, Response> {
    let tokens = TokenPair::new(credentials.access(), credentials.refresh());

    match verifier.verify(tokens, policy) {
        Ok(Verdict::Allowed { identity, renewed }) => Ok(Granted {
            identity,
            renewed,
            transport: credentials.transport(),
        }),
        Ok(Verdict::Denied(denial)) => Err(errors::denial_to_response(&denial)),
        Err(e) => {
            tracing::error!(error = %e, policy = policy.kind(), "request verification failed");
            Err(errors::internal_error())
        }
    }
}
