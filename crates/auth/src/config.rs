//! Token secrets and lifetimes, loaded once at process start.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest lifetime accepted for either token (ten years).
pub const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} secret is not configured")]
    MissingSecret(&'static str),

    #[error("access and refresh tokens must be signed with different secrets")]
    SharedSecret,

    #[error("{0} lifetime must be between 1 second and ten years")]
    InvalidLifetime(&'static str),

    #[error("environment variable {var} has an invalid value: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Token configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub access_secret: String,
    #[serde(skip_serializing)]
    pub refresh_secret: String,
    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// Clock skew tolerated when checking expiry.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
            leeway_secs: 0,
        }
    }
}

impl AuthConfig {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    pub fn with_access_ttl_secs(mut self, secs: i64) -> Self {
        self.access_ttl_secs = secs;
        self
    }

    pub fn with_refresh_ttl_secs(mut self, secs: i64) -> Self {
        self.refresh_ttl_secs = secs;
        self
    }

    pub fn with_leeway_secs(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }

    /// Read the configuration from `SPENDBOOK_*` environment variables.
    ///
    /// Missing secrets fall back to insecure development values with a
    /// warning; malformed numbers are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let secret = |var: &'static str, fallback: &str| {
            lookup(var).filter(|v| !v.is_empty()).unwrap_or_else(|| {
                tracing::warn!("{var} not set; using insecure dev default");
                fallback.to_string()
            })
        };

        Ok(Self {
            access_secret: secret("SPENDBOOK_ACCESS_SECRET", "dev-access-secret"),
            refresh_secret: secret("SPENDBOOK_REFRESH_SECRET", "dev-refresh-secret"),
            access_ttl_secs: parse_env(&lookup, "SPENDBOOK_ACCESS_TTL_SECS", defaults.access_ttl_secs)?,
            refresh_ttl_secs: parse_env(&lookup, "SPENDBOOK_REFRESH_TTL_SECS", defaults.refresh_ttl_secs)?,
            leeway_secs: parse_env(&lookup, "SPENDBOOK_TOKEN_LEEWAY_SECS", defaults.leeway_secs)?,
        })
    }

    pub fn access_ttl(&self) -> Result<Duration, ConfigError> {
        lifetime("access", self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Result<Duration, ConfigError> {
        lifetime("refresh", self.refresh_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.is_empty() {
            return Err(ConfigError::MissingSecret("access"));
        }
        if self.refresh_secret.is_empty() {
            return Err(ConfigError::MissingSecret("refresh"));
        }
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }
        self.access_ttl()?;
        self.refresh_ttl()?;
        if self.access_secret.len() < 32 || self.refresh_secret.len() < 32 {
            tracing::warn!("token secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

fn lifetime(kind: &'static str, secs: i64) -> Result<Duration, ConfigError> {
    if !(1..=MAX_TTL_SECS).contains(&secs) {
        return Err(ConfigError::InvalidLifetime(kind));
    }
    Duration::try_seconds(secs).ok_or(ConfigError::InvalidLifetime(kind))
}

fn parse_env<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}
