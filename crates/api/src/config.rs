//! Process configuration for the API binary.

use std::net::SocketAddr;

use spendbook_auth::{AuthConfig, ConfigError};
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ApiConfigError {
    #[error(transparent)]
    Auth(#[from] ConfigError),

    #[error("SPENDBOOK_BIND_ADDR is not a socket address: {0:?}")]
    BindAddr(String),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
}

impl ApiConfig {
    /// Read `SPENDBOOK_BIND_ADDR` and the token settings from the environment.
    pub fn from_env() -> Result<Self, ApiConfigError> {
        let raw = std::env::var("SPENDBOOK_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw.parse().map_err(|_| ApiConfigError::BindAddr(raw))?;

        let auth = AuthConfig::from_env()?;
        auth.validate()?;

        Ok(Self { bind_addr, auth })
    }
}
