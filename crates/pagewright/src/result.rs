//! Result and error types for pagewright.

use std::fmt;
use thiserror::Error;

/// Result type for pagewright operations
pub type PageResult<T> = Result<T, PageError>;

/// Outcome of a domain action. Success carries the action's value.
pub type ActionResult<T = ()> = PageResult<T>;

/// Coarse classification of a failure, stable across error payload changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FailureKind {
    /// No locator alternative resolved in time
    NotFound,
    /// A wait condition was never satisfied
    Timeout,
    /// Observed state diverged from the expected state
    Assertion,
    /// The expected URL was never reached
    Navigation,
    /// Still on the login page after submitting credentials
    Auth,
    /// Table present but without header cells or body rows
    TableNotPopulated,
    /// The browser driver reported an error
    Driver,
    /// The session was cancelled
    Cancelled,
    /// Configuration could not be read
    Config,
    /// A locator, policy or page definition was malformed
    Invalid,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not-found",
            Self::Timeout => "timeout",
            Self::Assertion => "assertion-failed",
            Self::Navigation => "navigation",
            Self::Auth => "auth",
            Self::TableNotPopulated => "table-not-populated",
            Self::Driver => "driver",
            Self::Cancelled => "cancelled",
            Self::Config => "config",
            Self::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum PageError {
    /// No alternative of a locator resolved before the timeout
    #[error(
        "element '{element}' not found after {timeout_ms}ms (tried: {})",
        alternatives.join(" | ")
    )]
    NotFound {
        /// Logical element name
        element: String,
        /// Every selector that was attempted, in priority order
        alternatives: Vec<String>,
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// Wait condition never satisfied
    #[error("timed out after {timeout_ms}ms waiting for {condition}{}", last_error.as_ref().map(|e| format!(" (last error: {e})")).unwrap_or_default())]
    Timeout {
        /// Description of the condition
        condition: String,
        /// Timeout that elapsed
        timeout_ms: u64,
        /// Last driver error seen while polling, if any
        last_error: Option<String>,
    },

    /// Observed state diverges from the expected state
    #[error("assertion failed for {subject}: expected {expected}, got {actual}")]
    Assertion {
        /// What was checked
        subject: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    /// The expected URL was never reached
    #[error("navigation to {target} failed: {message}")]
    Navigation {
        /// Page or URL being navigated to
        target: String,
        /// Error message
        message: String,
    },

    /// Post-login URL still matches the login page
    #[error("login failed: still on {url}")]
    Auth {
        /// URL observed after the wait
        url: String,
    },

    /// Table has no header cells or no body rows
    #[error("table '{table}' not populated: {header_count} header cells, {row_count} rows")]
    TableNotPopulated {
        /// Logical table name
        table: String,
        /// Header cells observed
        header_count: usize,
        /// Body rows observed
        row_count: usize,
    },

    /// Driver-level failure
    #[error("driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// The session was cancelled while an action was in flight
    #[error("cancelled")]
    Cancelled,

    /// Configuration error
    #[error("configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Locator definition without alternatives
    #[error("locator '{name}' has no selector alternatives")]
    InvalidLocator {
        /// Logical element name
        name: String,
    },

    /// Selector string that cannot be parsed
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector {
        /// Raw selector text
        selector: String,
        /// What is wrong with it
        message: String,
    },

    /// Wait policy with a zero timeout or poll interval
    #[error("invalid wait policy: {message}")]
    InvalidPolicy {
        /// Error message
        message: String,
    },

    /// Page definition error (unknown or duplicate element name)
    #[error("page '{page}': {message}")]
    InvalidPage {
        /// Page name
        page: String,
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PageError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(
        subject: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Assertion {
            subject: subject.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Assertion { .. } => FailureKind::Assertion,
            Self::Navigation { .. } => FailureKind::Navigation,
            Self::Auth { .. } => FailureKind::Auth,
            Self::TableNotPopulated { .. } => FailureKind::TableNotPopulated,
            Self::Driver { .. } | Self::Io(_) | Self::Json(_) => FailureKind::Driver,
            Self::Cancelled => FailureKind::Cancelled,
            Self::Config { .. } => FailureKind::Config,
            Self::InvalidLocator { .. }
            | Self::InvalidSelector { .. }
            | Self::InvalidPolicy { .. }
            | Self::InvalidPage { .. } => FailureKind::Invalid,
        }
    }

    /// Whether this failure came from a condition that never held in time.
    ///
    /// Only these failures may be tolerated by optional observations.
    #[must_use]
    pub const fn is_wait_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Timeout { .. })
    }
}
