//! Session configuration and credentials.
//!
//! Values come from the environment (`from_env`) or any key lookup
//! (`from_lookup`, used by tests), with defaults for everything.

use crate::result::{PageError, PageResult};
use crate::wait::{Condition, WaitPolicy, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default dashboard under test
pub const DEFAULT_BASE_URL: &str = "https://dashboard.kaiterra.com";

/// Fallback login email
pub const DEFAULT_EMAIL: &str = "test@example.com";

/// Fallback login password
pub const DEFAULT_PASSWORD: &str = "testpassword";

/// Environment variable names
pub mod env {
    /// Login email
    pub const EMAIL: &str = "TEST_EMAIL";
    /// Login password
    pub const PASSWORD: &str = "TEST_PASSWORD";
    /// Base URL of the application
    pub const BASE_URL: &str = "PAGEWRIGHT_BASE_URL";
    /// Default wait timeout in milliseconds
    pub const TIMEOUT_MS: &str = "PAGEWRIGHT_TIMEOUT_MS";
    /// Default poll interval in milliseconds
    pub const POLL_MS: &str = "PAGEWRIGHT_POLL_MS";
    /// Directory screenshots are written to
    pub const SCREENSHOT_DIR: &str = "PAGEWRIGHT_SCREENSHOT_DIR";
}

/// Login credentials. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_EMAIL, DEFAULT_PASSWORD)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Login credentials
    pub credentials: Credentials,
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Default wait timeout in milliseconds
    pub timeout_ms: u64,
    /// Default poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Directory relative screenshot paths resolve against
    pub screenshot_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            screenshot_dir: PathBuf::from("."),
        }
    }
}

impl SessionConfig {
    /// Create default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the process environment
    pub fn from_env() -> PageResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a key lookup; missing keys use defaults
    pub fn from_lookup<F>(lookup: F) -> PageResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            credentials: Credentials::new(
                read(env::EMAIL).unwrap_or(defaults.credentials.email),
                read(env::PASSWORD).unwrap_or(defaults.credentials.password),
            ),
            base_url: read(env::BASE_URL).unwrap_or(defaults.base_url),
            timeout_ms: read(env::TIMEOUT_MS)
                .map(|v| parse_millis(env::TIMEOUT_MS, &v))
                .transpose()?
                .unwrap_or(defaults.timeout_ms),
            poll_interval_ms: read(env::POLL_MS)
                .map(|v| parse_millis(env::POLL_MS, &v))
                .transpose()?
                .unwrap_or(defaults.poll_interval_ms),
            screenshot_dir: read(env::SCREENSHOT_DIR)
                .map_or(defaults.screenshot_dir, PathBuf::from),
        };
        config.validated()
    }

    /// Set credentials
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set default timeout
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set default poll interval
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Check invariants and normalize the base URL
    pub fn validated(mut self) -> PageResult<Self> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(PageError::Config {
                message: format!("base URL must be http(s): {:?}", self.base_url),
            });
        }
        self.base_url = trimmed.to_string();
        self.default_policy(Condition::Visible).map_err(|e| PageError::Config {
            message: e.to_string(),
        })?;
        Ok(self)
    }

    /// Absolute URL for a path on the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Wait policy with the configured timing
    pub fn default_policy(&self, condition: Condition) -> PageResult<WaitPolicy> {
        WaitPolicy::from_millis(self.timeout_ms, self.poll_interval_ms, condition)
    }
}

fn parse_millis(key: &str, value: &str) -> PageResult<u64> {
    value.trim().parse::<u64>().map_err(|e| PageError::Config {
        message: format!("{key}={value:?} is not a number of milliseconds: {e}"),
    })
}
