use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::Response,
};

use spendbook_auth::AuthPolicy;

use crate::app::{dto, services::AppServices};
use crate::authz;
use crate::context::RequestCredentials;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(services): Extension<Arc<AppServices>>, headers: HeaderMap) -> Response {
    let credentials = RequestCredentials::from_headers(&headers);
    let granted = match authz::authorize_request(&services.verifier, &credentials, &AuthPolicy::Unrestricted) {
        Ok(g) => g,
        Err(resp) => return resp,
    };

    let body = dto::identity_to_json(granted.identity());
    granted.respond(StatusCode::OK, body)
}
