use std::{collections::BTreeSet, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde_json::json;

use spendbook_auth::AuthPolicy;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::RequestCredentials;

/// Group membership, visible to members only.
///
/// An unknown group has no members, so it is indistinguishable from a group
/// the caller does not belong to.
pub async fn get_group(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    let members = services.groups.members(&name);
    let policy = AuthPolicy::group_member(members.iter().cloned());

    let credentials = RequestCredentials::from_headers(&headers);
    let granted = match authz::authorize_request(&services.verifier, &credentials, &policy) {
        Ok(g) => g,
        Err(resp) => return resp,
    };

    granted.respond(StatusCode::OK, json!({ "name": name, "members": members }))
}

/// Create or replace a group (administrators only).
pub async fn put_group(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let credentials = RequestCredentials::from_headers(&headers);
    let granted = match authz::authorize_request(&services.verifier, &credentials, &AuthPolicy::Administrator) {
        Ok(g) => g,
        Err(resp) => return resp,
    };

    // Parsed only after authorization so anonymous callers learn nothing about the schema.
    let request: dto::PutGroupRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
    };

    let members: BTreeSet<String> = request
        .members
        .into_iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    services.groups.replace(&name, members.clone());
    tracing::info!(group = %name, by = %granted.identity().username, size = members.len(), "group replaced");

    granted.respond(StatusCode::OK, json!({ "name": name, "members": members }))
}
