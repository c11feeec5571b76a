//! Client configuration.
//!
//! Credentials are passed in explicitly; [`ClientConfig::from_env`] is a
//! convenience for binaries that keep them in the environment.

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use crate::error::ConfigError;
use crate::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://api.phish.net/";
pub const DEFAULT_VERSION: &str = "v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENV_API_KEY: &str = "PHISHNET_API_KEY";
pub const ENV_APP_ID: &str = "PHISHNET_APP_ID";
pub const ENV_PRIVATE_SALT: &str = "PHISHNET_PRIVATE_SALT";
pub const ENV_BASE_URL: &str = "PHISHNET_BASE_URL";

#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub version: String,
    /// Applied to each attempt, not to a whole retry sequence.
    pub timeout: Duration,
    pub verify_tls: bool,
    pub retry: RetryPolicy,
    pub app_id: Option<u64>,
    pub private_salt: Option<String>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: String::from(DEFAULT_BASE_URL),
            version: String::from(DEFAULT_VERSION),
            timeout: DEFAULT_TIMEOUT,
            verify_tls: true,
            retry: RetryPolicy::default(),
            app_id: None,
            private_salt: None,
        }
    }

    /// Reads credentials from `PHISHNET_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(ENV_API_KEY)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar { name: ENV_API_KEY })?;

        let mut config = Self::new(api_key);

        if let Some(raw) = lookup(ENV_APP_ID) {
            let app_id = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: ENV_APP_ID,
                value: raw.clone(),
            })?;
            config.app_id = Some(app_id);
        }

        config.private_salt = lookup(ENV_PRIVATE_SALT);

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_app_id(mut self, app_id: u64) -> Self {
        self.app_id = Some(app_id);
        self
    }

    pub fn with_private_salt(mut self, private_salt: impl Into<String>) -> Self {
        self.private_salt = Some(private_salt.into());
        self
    }

    /// `{base_url}/{version}/` with exactly one slash between the parts.
    pub fn versioned_base(&self) -> String {
        format!(
            "{}/{}/",
            self.base_url.trim_end_matches('/'),
            self.version.trim_matches('/')
        )
    }

    /// Full URL of an endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.versioned_base(), path.trim_start_matches('/'))
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .field("timeout", &self.timeout)
            .field("verify_tls", &self.verify_tls)
            .field("retry", &self.retry)
            .field("app_id", &self.app_id)
            .field(
                "private_salt",
                &self.private_salt.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
