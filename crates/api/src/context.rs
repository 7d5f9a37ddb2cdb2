//! Credentials carried by an incoming request.

use axum::http::{HeaderMap, header};

/// Cookie holding the access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie holding the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";
/// Header carrying the refresh token for clients that do not use cookies.
pub const REFRESH_HEADER: &str = "x-refresh-token";
/// Response header carrying a renewed access token to header-based clients.
pub const RENEWED_ACCESS_HEADER: &str = "x-access-token";

/// How the client sent its access token, and so how a renewed one goes back.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transport {
    Cookie,
    Header,
}

/// Token pair extracted from one request. Cookies win over headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCredentials {
    access: Option<String>,
    refresh: Option<String>,
    transport: Transport,
}

impl RequestCredentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookie_access = get_cookie(headers, ACCESS_COOKIE);
        let bearer = extract_bearer(headers);
        let transport = if cookie_access.is_none() && bearer.is_some() {
            Transport::Header
        } else {
            Transport::Cookie
        };

        let refresh = get_cookie(headers, REFRESH_COOKIE).or_else(|| {
            headers
                .get(REFRESH_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
        });

        Self {
            access: cookie_access.or(bearer),
            refresh,
            transport,
        }
    }

    pub fn access(&self) -> Option<&str> {
        self.access.as_deref()
    }

    pub fn refresh(&self) -> Option<&str> {
        self.refresh.as_deref()
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }
}

/// Value of the named cookie across all `Cookie` headers, if present.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();

    (!token.is_empty()).then(|| token.to_string())
}
