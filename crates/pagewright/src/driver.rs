//! Driver - abstract browser automation seam
//!
//! Page objects never talk to a browser directly. Everything they need from
//! a live page goes through [`Driver`], so the same page object runs against
//! the CDP-backed `ChromiumDriver` (feature `browser`) or the scriptable
//! [`MockDriver`](crate::MockDriver) in unit tests.
//!
//! Handles are snapshots: a [`ElementHandle`] remembers which selector and
//! which match index produced it, and drivers re-locate the element from
//! that pair when it is acted on.

use crate::locator::Selector;
use crate::result::PageResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Snapshot of one element matched by a selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Selector that matched the element
    pub selector: Selector,
    /// Position among the selector's matches, in document order
    pub index: usize,
    /// Lower-case tag name
    pub tag_name: String,
    /// Trimmed text content at query time
    pub text: String,
    /// Whether the element was rendered and visible at query time
    pub visible: bool,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(selector: Selector, index: usize, tag_name: impl Into<String>) -> Self {
        Self {
            selector,
            index,
            tag_name: tag_name.into(),
            text: String::new(),
            visible: false,
        }
    }

    /// Set the text snapshot
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the visibility snapshot
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Check if element was visible when queried
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.selector, self.index)
    }
}

/// `document.readyState` of the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    /// Document still loading
    Loading,
    /// DOM parsed, subresources still loading
    Interactive,
    /// Load event fired
    Complete,
}

/// Observable loading state of the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    /// Document ready state
    pub ready_state: ReadyState,
    /// Number of network resources the page has requested so far
    pub resource_count: usize,
}

impl DocumentState {
    /// Fully loaded document with the given resource count
    #[must_use]
    pub const fn complete(resource_count: usize) -> Self {
        Self {
            ready_state: ReadyState::Complete,
            resource_count,
        }
    }
}

/// Abstract driver trait for browser automation
///
/// Every call may suspend until the browser answers. Implementations must not
/// retry internally; waiting is the job of [`WaitPolicy`](crate::WaitPolicy).
///
/// # Implementations
///
/// - `ChromiumDriver` - uses chromiumoxide (feature `browser`)
/// - `MockDriver` - in-memory pages for unit testing
#[async_trait]
pub trait Driver: Send + Sync + fmt::Debug {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> PageResult<()>;

    /// Current document loading state
    async fn document_state(&self) -> PageResult<DocumentState>;

    /// Query all elements matching a selector, in document order
    async fn query_all(&self, selector: &Selector) -> PageResult<Vec<ElementHandle>>;

    /// Replace the value of an input element
    async fn fill(&self, element: &ElementHandle, text: &str) -> PageResult<()>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> PageResult<()>;

    /// Current trimmed text content of an element
    async fn text(&self, element: &ElementHandle) -> PageResult<String>;

    /// Current value of an input element
    async fn input_value(&self, element: &ElementHandle) -> PageResult<String>;

    /// Attribute value, `None` when absent
    async fn attribute(&self, element: &ElementHandle, name: &str) -> PageResult<Option<String>>;

    /// Get current URL
    async fn current_url(&self) -> PageResult<String>;

    /// Document title
    async fn title(&self) -> PageResult<String>;

    /// Write a PNG screenshot of the viewport to `path`
    async fn screenshot(&self, path: &Path) -> PageResult<()>;
}
