//! Startup configuration.
//!
//! Everything the process needs to reach the upstream calculation API is
//! collected once into [`UpstreamConfig`] and passed down explicitly.

use std::time::Duration;

/// Default URL for a locally running calculation API.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the upstream chart calculation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL without the `/api/v1` prefix.
    pub base_url: String,
    /// Sent as `X-API-Key` when present.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for an API path such as `/api/v1/current_transits`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, None)
    }
}
