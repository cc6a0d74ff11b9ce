//! Error types for the CLI

use pagewright::PageError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A page check failed
    #[error("{step} failed: {source}")]
    Check {
        /// Step that failed
        step: String,
        /// What went wrong on the page
        #[source]
        source: PageError,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pagewright library error
    #[error("Pagewright error: {0}")]
    Page(#[from] PageError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Attach the failing step to a page error
    #[must_use]
    pub fn check(step: impl Into<String>, source: PageError) -> Self {
        Self::Check {
            step: step.into(),
            source,
        }
    }
}

/// Label page results with the step they belong to
pub trait StepExt<T> {
    /// Wrap an error as [`CliError::Check`] for `step`
    fn step(self, step: &str) -> CliResult<T>;
}

impl<T> StepExt<T> for Result<T, PageError> {
    fn step(self, step: &str) -> CliResult<T> {
        self.map_err(|e| CliError::check(step, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad base url");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("bad base url"));
    }

    #[test]
    fn test_check_error_names_step() {
        let err = CliError::check(
            "login",
            PageError::Auth {
                url: "https://dash.test/login".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "login failed: login failed: still on https://dash.test/login"
        );
    }

    #[test]
    fn test_step_ext() {
        let result: Result<(), PageError> = Err(PageError::Cancelled);
        match result.step("navigate") {
            Err(CliError::Check { step, source }) => {
                assert_eq!(step, "navigate");
                assert!(matches!(source, PageError::Cancelled));
            }
            other => panic!("expected check error, got {other:?}"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CliError = io.into();
        assert!(err.to_string().contains("I/O error"));
    }
}
