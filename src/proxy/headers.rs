//! Header utilities for upstream proxying
//!
//! The caller's bearer token is the upstream credential. Only that token is
//! taken from the inbound request; every other outbound header is fixed.

use std::fmt;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap as InboundHeaders;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use crate::error::{AppError, AppResult};

/// Referer header used by upstream routers to attribute the calling app
pub const REFERER_HEADER: HeaderName = HeaderName::from_static("http-referer");
/// Title header used by upstream routers to name the calling app
pub const TITLE_HEADER: HeaderName = HeaderName::from_static("x-title");

/// Bearer token forwarded verbatim to the upstream provider
///
/// Never logged: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamCredential(String);

impl UpstreamCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Extract the credential from an inbound `Authorization: Bearer <token>`
    pub fn from_headers(headers: &InboundHeaders) -> AppResult<Self> {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(Self::new)
            .ok_or(AppError::MissingCredential)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UpstreamCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UpstreamCredential(***)")
    }
}

/// Build headers for upstream requests
///
/// Carries the caller's credential plus fixed identification headers.
pub fn build_upstream_headers(
    credential: &UpstreamCredential,
    referer: &str,
    title: &str,
) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    let auth = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
        .map_err(|_| AppError::Validation("Authorization header contains invalid characters".into()))?;
    headers.insert(reqwest::header::AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Ok(value) = HeaderValue::from_str(referer) {
        headers.insert(REFERER_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(title) {
        headers.insert(TITLE_HEADER, value);
    }

    Ok(headers)
}
