use axum::{Router, routing::get};

pub mod groups;
pub mod system;
pub mod transactions;
pub mod users;

/// Router for all endpoints that pass through the request gate.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/users/:username", get(users::get_user))
        .route("/groups/:name", get(groups::get_group).put(groups::put_group))
        .route("/transactions/filters", get(transactions::preview_filters))
}
