use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::Response,
};

use spendbook_auth::AuthPolicy;

use crate::app::{dto, services::AppServices};
use crate::authz;
use crate::context::RequestCredentials;

/// A user's own profile, as known from their token.
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Response {
    let credentials = RequestCredentials::from_headers(&headers);
    let policy = AuthPolicy::same_user(username);
    let granted = match authz::authorize_request(&services.verifier, &credentials, &policy) {
        Ok(g) => g,
        Err(resp) => return resp,
    };

    let body = dto::identity_to_json(granted.identity());
    granted.respond(StatusCode::OK, body)
}
