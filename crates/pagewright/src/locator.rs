//! Locator abstraction for element selection.
//!
//! A [`LocatorSpec`] names one logical element ("email field", "submit
//! button") and lists the selectors that may find it, most specific first.
//! [`ElementLocator`] resolves a spec within a [`WaitPolicy`]:
//!
//! - every poll tick tries all alternatives in priority order
//! - the first alternative with a match satisfying the condition wins
//! - the whole call shares one deadline, so adding alternatives never adds time
//! - if nothing matched before the deadline the error lists every alternative

use crate::driver::{Driver, ElementHandle};
use crate::result::{PageError, PageResult};
use crate::wait::{poll_until, Condition, WaitPolicy};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

const HAS_TEXT: &str = ":has-text(";
const SCOPE_SEPARATOR: &str = ">>";

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Innermost element whose text matches.
    /// Exact compares trimmed text; otherwise a case-insensitive substring.
    Text {
        /// Text to match
        text: String,
        /// Whole-text match instead of substring
        exact: bool,
    },
    /// CSS selector filtered by case-insensitive text content
    /// (`button:has-text("Log in")`)
    HasText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// CSS matched inside the elements of another selector
    /// (`tr:has-text("Office") >> button`)
    Scoped {
        /// Selector for the enclosing elements
        scope: Box<Selector>,
        /// CSS selector evaluated inside each scope element
        inner: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a substring text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: false,
        }
    }

    /// Create an exact text selector
    #[must_use]
    pub fn exact_text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: true,
        }
    }

    /// Create a CSS selector with a text filter
    #[must_use]
    pub fn has_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::HasText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Scope a CSS selector to the elements matched by this one
    #[must_use]
    pub fn within(self, inner: impl Into<String>) -> Self {
        Self::Scoped {
            scope: Box::new(self),
            inner: inner.into(),
        }
    }

    /// Parse selector syntax.
    ///
    /// Recognized forms: `text="Exact"`, `text=substring`, `data-testid=id`,
    /// `css:has-text("text")` (trailing only, one per selector),
    /// `scope >> css`, anything else is CSS. Quoted text may contain `>>`,
    /// commas and escaped quotes.
    pub fn parse(raw: &str) -> PageResult<Self> {
        let raw = raw.trim();
        let invalid = |message: &str| PageError::InvalidSelector {
            selector: raw.to_string(),
            message: message.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("empty selector"));
        }

        if let Some(&at) = top_level_matches(raw, SCOPE_SEPARATOR).last() {
            let (scope, inner) = (&raw[..at], raw[at + SCOPE_SEPARATOR.len()..].trim());
            if inner.is_empty() {
                return Err(invalid("nothing after '>>'"));
            }
            return Ok(Self::parse(scope)?.within(inner));
        }

        if let Some(rest) = raw.strip_prefix("text=") {
            return match unquote(rest) {
                Some(text) => Ok(Self::exact_text(text)),
                None if rest.is_empty() => Err(invalid("empty text")),
                None => Ok(Self::text(rest)),
            };
        }

        if let Some(id) = raw.strip_prefix("data-testid=") {
            let id = unquote(id).unwrap_or(id);
            if id.is_empty() {
                return Err(invalid("empty test id"));
            }
            return Ok(Self::test_id(id));
        }

        if let Some(&start) = top_level_matches(raw, HAS_TEXT).first() {
            let css = raw[..start].trim();
            if css.is_empty() {
                return Err(invalid(":has-text() needs a base selector"));
            }
            let (text, rest) = quoted_prefix(raw[start + HAS_TEXT.len()..].trim_start())
                .ok_or_else(|| invalid(":has-text() takes one quoted string"))?;
            let rest = rest
                .trim_start()
                .strip_prefix(')')
                .ok_or_else(|| invalid(":has-text() takes one quoted string"))?;
            if !rest.trim().is_empty() {
                return Err(invalid(":has-text() must close the selector"));
            }
            return Ok(Self::has_text(css, text));
        }

        Ok(Self::css(raw))
    }

    /// Whether `candidate` (an element's text content) satisfies this
    /// selector's text filter. Selectors without one accept anything.
    #[must_use]
    pub fn matches_text(&self, candidate: &str) -> bool {
        match self {
            Self::Text { text, exact: true } => candidate.trim() == text,
            Self::Text { text, exact: false } | Self::HasText { text, .. } => candidate
                .to_lowercase()
                .contains(&text.to_lowercase()),
            Self::Css(_) | Self::TestId(_) | Self::Scoped { .. } => true,
        }
    }

    /// JavaScript expression evaluating to an array of the matched elements,
    /// in document order
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(css) => format!("Array.from(document.querySelectorAll({}))", js_str(css)),
            Self::TestId(id) => format!(
                "Array.from(document.querySelectorAll({}))",
                js_str(&format!("[data-testid={}]", js_str(id)))
            ),
            Self::HasText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => (el.textContent || '').toLowerCase().includes({}))",
                js_str(css),
                js_str(&text.to_lowercase())
            ),
            Self::Text { text, exact } => {
                let test = if *exact {
                    format!("(n => (n.textContent || '').trim() === {})", js_str(text))
                } else {
                    format!(
                        "(n => (n.textContent || '').toLowerCase().includes({}))",
                        js_str(&text.to_lowercase())
                    )
                };
                format!(
                    "(() => {{ const t = {test}; return Array.from(document.querySelectorAll('body *')).filter(el => t(el) && !Array.from(el.children).some(t)); }})()"
                )
            }
            Self::Scoped { scope, inner } => format!(
                "{}.flatMap(s => Array.from(s.querySelectorAll({})))",
                scope.to_query_all(),
                js_str(inner)
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => f.write_str(css),
            Self::Text { text, exact: true } => write!(f, "text={text:?}"),
            Self::Text { text, exact: false } => write!(f, "text={text}"),
            Self::HasText { css, text } => write!(f, "{css}:has-text({text:?})"),
            Self::TestId(id) => write!(f, "data-testid={id}"),
            Self::Scoped { scope, inner } => write!(f, "{scope} >> {inner}"),
        }
    }
}

fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn unquote(s: &str) -> Option<&str> {
    ['"', '\'']
        .iter()
        .find_map(|q| s.strip_prefix(*q).and_then(|rest| rest.strip_suffix(*q)))
}

/// Leading quoted string (either quote style, backslash escapes) and the
/// input after its closing quote
fn quoted_prefix(s: &str) -> Option<(String, &str)> {
    let mut chars = s.char_indices();
    let (_, quote) = chars.next().filter(|&(_, c)| matches!(c, '"' | '\''))?;
    let mut text = String::new();
    let mut escaped = false;
    for (i, c) in chars {
        match c {
            _ if escaped => {
                text.push(c);
                escaped = false;
            }
            '\\' => escaped = true,
            c if c == quote => return Some((text, &s[i + c.len_utf8()..])),
            c => text.push(c),
        }
    }
    None
}

/// Byte offsets of `needle` outside quotes, brackets and parentheses
fn top_level_matches(raw: &str, needle: &str) -> Vec<usize> {
    let mut found = Vec::new();
    let mut depth = 0_i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in raw.char_indices() {
        if quote.is_none() && depth == 0 && raw[i..].starts_with(needle) {
            found.push(i);
        }
        match (quote, c) {
            (Some(_), _) if escaped => escaped = false,
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            _ => {}
        }
    }
    found
}

/// Split on commas that are outside quotes, brackets and parentheses
fn split_top_level(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}

// =============================================================================
// LOCATOR SPEC
// =============================================================================

/// A named element with ordered selector alternatives.
///
/// Always has at least one alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatorSpec {
    name: String,
    alternatives: Vec<Selector>,
}

impl LocatorSpec {
    /// Create a spec from explicit alternatives
    pub fn new(name: impl Into<String>, alternatives: Vec<Selector>) -> PageResult<Self> {
        let name = name.into();
        if alternatives.is_empty() {
            return Err(PageError::InvalidLocator { name });
        }
        Ok(Self { name, alternatives })
    }

    /// Spec with a single selector
    #[must_use]
    pub fn single(name: impl Into<String>, selector: Selector) -> Self {
        Self {
            name: name.into(),
            alternatives: vec![selector],
        }
    }

    /// Parse a comma-separated list of alternatives,
    /// e.g. `input[name="email"], input[type="email"]`
    pub fn parse(name: impl Into<String>, raw: &str) -> PageResult<Self> {
        let alternatives = split_top_level(raw)
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .map(Selector::parse)
            .collect::<PageResult<Vec<_>>>()?;
        Self::new(name, alternatives)
    }

    /// Logical element name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternatives in priority order
    #[must_use]
    pub fn alternatives(&self) -> &[Selector] {
        &self.alternatives
    }

    /// Alternatives rendered for diagnostics
    #[must_use]
    pub fn described_alternatives(&self) -> Vec<String> {
        self.alternatives.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for LocatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.described_alternatives().join(" | "))
    }
}

// =============================================================================
// ELEMENT LOCATOR
// =============================================================================

/// Resolves [`LocatorSpec`]s against a driver
#[derive(Debug, Clone, Copy)]
pub struct ElementLocator<'a> {
    driver: &'a dyn Driver,
    cancel: &'a CancellationToken,
}

impl<'a> ElementLocator<'a> {
    /// Create a locator over a driver and cancellation token
    #[must_use]
    pub const fn new(driver: &'a dyn Driver, cancel: &'a CancellationToken) -> Self {
        Self { driver, cancel }
    }

    /// Resolve the first element satisfying the policy's condition.
    ///
    /// The condition must be `Visible` or `Attached`.
    pub async fn resolve(&self, spec: &LocatorSpec, policy: &WaitPolicy) -> PageResult<ElementHandle> {
        let mut matches = self.resolve_all(spec, policy).await?;
        // resolve_all never returns an empty list
        Ok(matches.swap_remove(0))
    }

    /// Resolve every element matched by the winning alternative.
    ///
    /// Waits until some alternative has at least one element satisfying the
    /// condition, then returns all of that alternative's satisfying matches.
    pub async fn resolve_all(
        &self,
        spec: &LocatorSpec,
        policy: &WaitPolicy,
    ) -> PageResult<Vec<ElementHandle>> {
        let visible_only = match policy.condition() {
            Condition::Visible => true,
            Condition::Attached => false,
            other => {
                return Err(PageError::InvalidPolicy {
                    message: format!("cannot resolve '{}' with condition '{other}'", spec.name()),
                })
            }
        };

        let waited_for = format!("'{}' {}", spec.name(), policy.condition());
        let driver = self.driver;
        let result = poll_until(policy, self.cancel, &waited_for, || async move {
            first_match(driver, spec, visible_only).await
        })
        .await;

        match result {
            Ok((index, found)) => {
                tracing::debug!(
                    element = spec.name(),
                    selector = %spec.alternatives()[index],
                    alternative = index,
                    count = found.len(),
                    "resolved"
                );
                Ok(found)
            }
            Err(PageError::Timeout { .. }) => {
                tracing::debug!(element = spec.name(), timeout_ms = policy.timeout_ms(), "not found");
                Err(PageError::NotFound {
                    element: spec.name().to_string(),
                    alternatives: spec.described_alternatives(),
                    timeout_ms: policy.timeout_ms(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Current number of attached matches of the first alternative that
    /// matches anything, without waiting
    pub async fn count(&self, spec: &LocatorSpec) -> PageResult<usize> {
        Ok(first_match(self.driver, spec, false)
            .await?
            .map_or(0, |(_, found)| found.len()))
    }

    /// Whether any alternative currently has a visible match, without waiting
    pub async fn is_visible(&self, spec: &LocatorSpec) -> PageResult<bool> {
        Ok(first_match(self.driver, spec, true).await?.is_some())
    }

    /// Visible matches of the first alternative that has any, without waiting
    pub async fn visible_matches(&self, spec: &LocatorSpec) -> PageResult<Vec<ElementHandle>> {
        Ok(first_match(self.driver, spec, true)
            .await?
            .map(|(_, found)| found)
            .unwrap_or_default())
    }

    /// Wait until no alternative has a visible match
    pub async fn wait_hidden(&self, spec: &LocatorSpec, policy: &WaitPolicy) -> PageResult<()> {
        let waited_for = format!("'{}' hidden", spec.name());
        let driver = self.driver;
        poll_until(policy, self.cancel, &waited_for, || async move {
            Ok(first_match(driver, spec, true).await?.is_none().then_some(()))
        })
        .await
    }
}

/// One pass over the alternatives in priority order.
///
/// A query error on one alternative does not stop later alternatives from
/// being tried; it is returned only when no alternative matched.
async fn first_match(
    driver: &dyn Driver,
    spec: &LocatorSpec,
    visible_only: bool,
) -> PageResult<Option<(usize, Vec<ElementHandle>)>> {
    let mut last_error = None;
    for (index, selector) in spec.alternatives().iter().enumerate() {
        match driver.query_all(selector).await {
            Ok(handles) => {
                let found: Vec<ElementHandle> = handles
                    .into_iter()
                    .filter(|h| !visible_only || h.is_visible())
                    .collect();
                if !found.is_empty() {
                    return Ok(Some((index, found)));
                }
            }
            Err(PageError::Cancelled) => return Err(PageError::Cancelled),
            Err(err) => last_error = Some(err),
        }
    }
    last_error.map_or(Ok(None), Err)
}
