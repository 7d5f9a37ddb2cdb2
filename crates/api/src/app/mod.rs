//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared state (verifier, group directory)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use spendbook_auth::{AuthConfig, ConfigError, Verifier};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AuthConfig) -> Result<Router, ConfigError> {
    let verifier = Verifier::new(config)?;
    let services = Arc::new(services::AppServices::new(verifier));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services)))
}
