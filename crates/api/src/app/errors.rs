use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use spendbook_auth::Denial;
use spendbook_core::FilterError;

pub fn denial_to_response(denial: &Denial) -> axum::response::Response {
    let status = if denial.is_forbidden() {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::UNAUTHORIZED
    };
    json_error(status, denial.code(), denial.to_string())
}

pub fn filter_error_to_response(err: &FilterError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", err.to_string())
}

pub fn internal_error() -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "the request could not be processed",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
