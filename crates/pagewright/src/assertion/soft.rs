//! Soft assertions
//!
//! Collect several verdicts and fail once with all of them.

use crate::result::{PageError, PageResult};
use serde::{Deserialize, Serialize};

/// Summary of assertion results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionSummary {
    /// Total assertions checked
    pub total: usize,
    /// Assertions that passed
    pub passed: usize,
    /// Assertions that failed
    pub failed: usize,
}

/// Soft assertions collector
///
/// ```ignore
/// let mut soft = SoftAssertions::new();
/// soft.check(AssertionHelper::assert_text_equals("title", &title, "Reports"));
/// soft.check(AssertionHelper::assert_visible(&button));
/// soft.verify()?;
/// ```
#[derive(Debug, Default)]
pub struct SoftAssertions {
    failures: Vec<PageError>,
    assertion_count: usize,
}

impl SoftAssertions {
    /// Create a new soft assertions collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verdict. Non-assertion errors are recorded too; cancellation
    /// is handed back so the caller can stop.
    pub fn check(&mut self, verdict: PageResult<()>) -> PageResult<()> {
        self.assertion_count += 1;
        match verdict {
            Ok(()) => Ok(()),
            Err(PageError::Cancelled) => Err(PageError::Cancelled),
            Err(err) => {
                tracing::debug!(error = %err, "soft assertion failed");
                self.failures.push(err);
                Ok(())
            }
        }
    }

    /// Failures so far
    #[must_use]
    pub fn failures(&self) -> &[PageError] {
        &self.failures
    }

    /// Check if all assertions passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Get a summary of the assertions
    #[must_use]
    pub fn summary(&self) -> AssertionSummary {
        AssertionSummary {
            total: self.assertion_count,
            passed: self.assertion_count - self.failures.len(),
            failed: self.failures.len(),
        }
    }

    /// Fail with every collected failure, or pass.
    ///
    /// A single failure is returned unchanged.
    pub fn verify(mut self) -> PageResult<()> {
        match self.failures.len() {
            0 => Ok(()),
            1 => Err(self.failures.remove(0)),
            n => Err(PageError::assertion(
                format!("{n} of {} checks", self.assertion_count),
                "all checks to pass",
                self.failures
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        }
    }
}
