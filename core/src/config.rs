//! Client configuration: credentials, base URL, optional timeout.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

use crate::error::ConfigError;

/// Production endpoint of the SmartBill API.
pub const DEFAULT_BASE_URL: &str = "https://ws.smartbill.ro/SBORO/api";

const ENV_USERNAME: &str = "SMARTBILL_USERNAME";
const ENV_TOKEN: &str = "SMARTBILL_TOKEN";
const ENV_BASE_URL: &str = "SMARTBILL_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "SMARTBILL_TIMEOUT_SECS";

/// Immutable connection settings shared by every facade.
///
/// The base URL is used verbatim: endpoint paths such as `/invoice` are
/// appended without slash normalization.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_base_url")]
    base_url: String,
    username: String,
    token: String,
    #[serde(skip)]
    timeout: Option<Duration>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            username: username.into(),
            token: token.into(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Default timeout applied to every call made with this configuration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `SMARTBILL_USERNAME`, `SMARTBILL_TOKEN` and the optional
    /// `SMARTBILL_BASE_URL` / `SMARTBILL_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let username = lookup(ENV_USERNAME).ok_or(ConfigError::MissingVar(ENV_USERNAME))?;
        let token = lookup(ENV_TOKEN).ok_or(ConfigError::MissingVar(ENV_TOKEN))?;
        let mut config = Self::new(username, token);

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|url| !url.is_empty()) {
            config = config.with_base_url(base_url);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout { value: raw.clone() })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `Basic base64(username:token)`.
    pub fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.token);
        format!("Basic {}", BASE64.encode(credentials))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
