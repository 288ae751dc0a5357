//! Client configuration.

use crate::api::ApiError;
use std::time::Duration;

/// Default base URL when `API_BASE` is not provided.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

/// Where the dashboard endpoints live and how long to wait for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    api_base: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Validates and normalises the base URL (trailing slashes removed).
    ///
    /// # Errors
    /// Returns `ApiError::InvalidBaseUrl` unless `api_base` is an absolute `http(s)` URL.
    pub fn new(api_base: &str) -> Result<Self, ApiError> {
        let trimmed = api_base.trim().trim_end_matches('/');
        let parsed = reqwest::Url::parse(trimmed)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{trimmed}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(format!(
                "{trimmed}: scheme must be http or https"
            )));
        }

        Ok(Self {
            api_base: trimmed.to_string(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Absolute URL for an endpoint path such as `/dashboard`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}
