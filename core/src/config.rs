//! Configuration for the contest API.
//!
//! ```rust
//! use contest_core::ApiConfig;
//!
//! let config = ApiConfig::new("https://contest.example.org")
//!     .with_timeout_ms(5_000)
//!     .with_client_credentials("mobile", "s3cret");
//! assert_eq!(config.timeout_ms, 5_000);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_CLIENT_ID: &str = "contest-mobile";
pub const DEFAULT_CLIENT_SECRET: &str = "contest-mobile-secret";

/// Base URL, request timeout and the fixed client credentials used for the
/// token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,
    pub timeout_ms: u64,
    pub client_id: String,
    pub client_secret: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Defaults overridden by `CONTEST_API_URL`, `CONTEST_API_TIMEOUT_MS`,
    /// `CONTEST_API_CLIENT_ID` and `CONTEST_API_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup("CONTEST_API_URL") {
            config.url = url;
        }
        if let Some(value) = lookup("CONTEST_API_TIMEOUT_MS") {
            config.timeout_ms = value
                .trim()
                .parse::<u64>()
                .map_err(|source| ConfigError::InvalidTimeout { value, source })?;
        }
        if let Some(client_id) = lookup("CONTEST_API_CLIENT_ID") {
            config.client_id = client_id;
        }
        if let Some(client_secret) = lookup("CONTEST_API_CLIENT_SECRET") {
            config.client_secret = client_secret;
        }
        Ok(config)
    }
}
