//! Assertions for page verification.
//!
//! Each check returns `Ok(())` or [`PageError::Assertion`] carrying the
//! subject, the expected value and the observed value. Checks compare values
//! already read from the page; the async helpers read through a [`Driver`]
//! first.

pub mod soft;

pub use soft::{AssertionSummary, SoftAssertions};

use crate::driver::{Driver, ElementHandle};
use crate::result::{PageError, PageResult};
use crate::url_pattern::UrlPattern;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected size of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountPredicate {
    /// Exactly n
    Exactly(usize),
    /// n or more
    AtLeast(usize),
    /// n or fewer
    AtMost(usize),
    /// Inclusive range
    Between(usize, usize),
}

impl CountPredicate {
    /// Check a count
    #[must_use]
    pub const fn accepts(&self, count: usize) -> bool {
        match *self {
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
            Self::AtMost(n) => count <= n,
            Self::Between(lo, hi) => lo <= count && count <= hi,
        }
    }
}

impl fmt::Display for CountPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "exactly {n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
            Self::AtMost(n) => write!(f, "at most {n}"),
            Self::Between(lo, hi) => write!(f, "between {lo} and {hi}"),
        }
    }
}

/// Assertion helpers for page state
#[derive(Debug, Clone, Copy)]
pub struct AssertionHelper;

impl AssertionHelper {
    /// Trimmed `actual` equals `expected`
    pub fn assert_text_equals(subject: &str, actual: &str, expected: &str) -> PageResult<()> {
        let actual = actual.trim();
        if actual == expected {
            Ok(())
        } else {
            Err(PageError::assertion(
                subject,
                format!("{expected:?}"),
                format!("{actual:?}"),
            ))
        }
    }

    /// `actual` contains `needle`
    pub fn assert_contains(subject: &str, actual: &str, needle: &str) -> PageResult<()> {
        if actual.contains(needle) {
            Ok(())
        } else {
            Err(PageError::assertion(
                subject,
                format!("text containing {needle:?}"),
                format!("{actual:?}"),
            ))
        }
    }

    /// Element was visible when queried
    pub fn assert_visible(handle: &ElementHandle) -> PageResult<()> {
        if handle.is_visible() {
            Ok(())
        } else {
            Err(PageError::assertion(handle.to_string(), "visible", "hidden"))
        }
    }

    /// Collection size satisfies the predicate
    pub fn assert_count(subject: &str, count: usize, predicate: CountPredicate) -> PageResult<()> {
        if predicate.accepts(count) {
            Ok(())
        } else {
            Err(PageError::assertion(
                subject,
                format!("{predicate} elements"),
                count.to_string(),
            ))
        }
    }

    /// Attribute value read from the page equals `expected`
    pub fn assert_attribute_value(
        subject: &str,
        name: &str,
        actual: Option<&str>,
        expected: &str,
    ) -> PageResult<()> {
        match actual {
            Some(value) if value == expected => Ok(()),
            Some(value) => Err(PageError::assertion(
                format!("{subject} @{name}"),
                format!("{expected:?}"),
                format!("{value:?}"),
            )),
            None => Err(PageError::assertion(
                format!("{subject} @{name}"),
                format!("{expected:?}"),
                "no such attribute",
            )),
        }
    }

    /// URL matches the pattern
    pub fn assert_url_matches(url: &str, pattern: &UrlPattern) -> PageResult<()> {
        if pattern.matches(url) {
            Ok(())
        } else {
            Err(PageError::assertion(
                "current URL",
                format!("URL matching {pattern}"),
                url,
            ))
        }
    }

    /// Read an attribute through the driver and compare it
    pub async fn assert_attribute(
        driver: &dyn Driver,
        handle: &ElementHandle,
        name: &str,
        expected: &str,
    ) -> PageResult<()> {
        let actual = driver.attribute(handle, name).await?;
        Self::assert_attribute_value(&handle.to_string(), name, actual.as_deref(), expected)
    }

    /// Read an element's text through the driver and compare it
    pub async fn assert_element_text(
        driver: &dyn Driver,
        handle: &ElementHandle,
        expected: &str,
    ) -> PageResult<()> {
        let actual = driver.text(handle).await?;
        Self::assert_text_equals(&handle.to_string(), &actual, expected)
    }
}
