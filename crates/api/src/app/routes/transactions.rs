use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::Response,
};

use spendbook_auth::AuthPolicy;
use spendbook_core::{RangeQuery, build_filters};

use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::RequestCredentials;

/// Range predicates a transaction listing would hand to storage.
pub async fn preview_filters(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
) -> Response {
    let credentials = RequestCredentials::from_headers(&headers);
    let granted = match authz::authorize_request(&services.verifier, &credentials, &AuthPolicy::Unrestricted) {
        Ok(g) => g,
        Err(resp) => return resp,
    };

    let filters = match build_filters(&query) {
        Ok(f) => f,
        Err(e) => return errors::filter_error_to_response(&e),
    };

    match serde_json::to_value(filters) {
        Ok(body) => granted.respond(StatusCode::OK, body),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize filters");
            errors::internal_error()
        }
    }
}
