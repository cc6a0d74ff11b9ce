//! Page Object Model support.
//!
//! A [`PageModel`] is the static description of a page: its path, the URL
//! pattern that identifies it, an optional in-app menu element that leads to
//! it, and a unique name for every element it knows about. A [`BoundPage`]
//! binds a model to a [`Session`] and provides the generic actions concrete
//! page objects are built from. Multi-step actions run inside an
//! [`ActionScope`] so the whole step sequence is one journal record.

use crate::action::{ActionHandle, ActionPhase};
use crate::assertion::{AssertionHelper, CountPredicate};
use crate::driver::ElementHandle;
use crate::fallback::{attempt_in_order, Strategy};
use crate::locator::{LocatorSpec, Selector};
use crate::result::{PageError, PageResult};
use crate::session::Session;
use crate::url_pattern::UrlPattern;
use crate::wait::{poll_until, Condition, LoadState, WaitPolicy, WaitResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound for the in-app menu navigation attempt
pub const DEFAULT_MENU_TIMEOUT_MS: u64 = 5_000;

/// Leading body rows checked for content by [`ActionScope::verify_table`]
pub const DEFAULT_SAMPLE_ROWS: usize = 3;

/// Trait for page objects representing a page or component in the UI.
pub trait PageObject {
    /// The bound page this object drives
    fn page(&self) -> &BoundPage;

    /// Page name
    fn page_name(&self) -> &str {
        self.page().model().name()
    }

    /// URL pattern that identifies this page
    fn url_pattern(&self) -> &UrlPattern {
        self.page().model().url_pattern()
    }
}

// =============================================================================
// PAGE MODEL
// =============================================================================

/// Static description of a page
#[derive(Debug, Clone)]
pub struct PageModel {
    name: String,
    path: String,
    url_pattern: UrlPattern,
    menu: Option<String>,
    menu_timeout: Duration,
    locators: BTreeMap<String, LocatorSpec>,
}

impl PageModel {
    /// Start building a model
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PageModelBuilder {
        PageModelBuilder::new(name)
    }

    /// Page name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical path, relative to the session's base URL
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Pattern the URL matches while on this page
    #[must_use]
    pub const fn url_pattern(&self) -> &UrlPattern {
        &self.url_pattern
    }

    /// Name of the menu element that leads here, if any
    #[must_use]
    pub fn menu(&self) -> Option<&str> {
        self.menu.as_deref()
    }

    /// Upper bound for the menu navigation attempt
    #[must_use]
    pub const fn menu_timeout(&self) -> Duration {
        self.menu_timeout
    }

    /// Locator for an element name
    pub fn locator(&self, name: &str) -> PageResult<&LocatorSpec> {
        self.locators.get(name).ok_or_else(|| PageError::InvalidPage {
            page: self.name.clone(),
            message: format!("no element named '{name}'"),
        })
    }

    /// Element names, sorted
    #[must_use]
    pub fn element_names(&self) -> Vec<&str> {
        self.locators.keys().map(String::as_str).collect()
    }
}

/// Builder for [`PageModel`]
#[derive(Debug)]
pub struct PageModelBuilder {
    name: String,
    path: String,
    url_pattern: Option<UrlPattern>,
    menu: Option<String>,
    menu_timeout: Duration,
    locators: Vec<LocatorSpec>,
    error: Option<PageError>,
}

impl PageModelBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: "/".to_string(),
            url_pattern: None,
            menu: None,
            menu_timeout: Duration::from_millis(DEFAULT_MENU_TIMEOUT_MS),
            locators: Vec::new(),
            error: None,
        }
    }

    /// Canonical path. Also the default URL pattern: this path or below it,
    /// whatever the host.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// URL pattern identifying the page
    #[must_use]
    pub fn with_url_pattern(mut self, pattern: UrlPattern) -> Self {
        self.url_pattern = Some(pattern);
        self
    }

    /// URL regex identifying the page; an invalid regex fails `build`
    #[must_use]
    pub fn with_url_regex(mut self, regex: &str) -> Self {
        match UrlPattern::regex(regex) {
            Ok(pattern) => self.url_pattern = Some(pattern),
            Err(err) => self.record(err),
        }
        self
    }

    /// Regex over the URL path identifying the page; an invalid regex
    /// fails `build`
    #[must_use]
    pub fn with_path_regex(mut self, regex: &str) -> Self {
        match UrlPattern::path_regex(regex) {
            Ok(pattern) => self.url_pattern = Some(pattern),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add an element from parsed alternatives
    #[must_use]
    pub fn with_locator(mut self, spec: LocatorSpec) -> Self {
        self.locators.push(spec);
        self
    }

    /// Add an element from comma-separated selector alternatives;
    /// a parse error fails `build`
    #[must_use]
    pub fn with_selectors(mut self, name: &str, alternatives: &str) -> Self {
        match LocatorSpec::parse(name, alternatives) {
            Ok(spec) => self.locators.push(spec),
            Err(err) => self.record(err),
        }
        self
    }

    /// Element clicked to reach the page through the UI
    #[must_use]
    pub fn with_menu(mut self, element: impl Into<String>) -> Self {
        self.menu = Some(element.into());
        self
    }

    /// Upper bound for the menu attempt
    #[must_use]
    pub const fn with_menu_timeout(mut self, timeout: Duration) -> Self {
        self.menu_timeout = timeout;
        self
    }

    fn record(&mut self, err: PageError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Build the model, rejecting duplicate names and an unknown menu element
    pub fn build(self) -> PageResult<PageModel> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let invalid = |message: String| PageError::InvalidPage {
            page: self.name.clone(),
            message,
        };

        let mut locators = BTreeMap::new();
        for spec in self.locators {
            let name = spec.name().to_string();
            if locators.insert(name.clone(), spec).is_some() {
                return Err(invalid(format!("duplicate element name '{name}'")));
            }
        }
        if let Some(menu) = &self.menu {
            if !locators.contains_key(menu) {
                return Err(invalid(format!("menu element '{menu}' is not defined")));
            }
        }
        if self.menu_timeout.is_zero() {
            return Err(invalid("menu timeout must be greater than zero".to_string()));
        }

        let url_pattern = self
            .url_pattern
            .unwrap_or_else(|| UrlPattern::path_prefix(self.path.clone()));
        Ok(PageModel {
            name: self.name,
            path: self.path,
            url_pattern,
            menu: self.menu,
            menu_timeout: self.menu_timeout,
            locators,
        })
    }
}

// =============================================================================
// TABLES
// =============================================================================

/// Where a data table lives and what it must contain
#[derive(Debug, Clone)]
pub struct TableSpec {
    /// Logical table name
    pub name: String,
    /// Table container
    pub container: LocatorSpec,
    /// Header cells
    pub headers: LocatorSpec,
    /// Body rows
    pub rows: LocatorSpec,
    /// Expected header texts, position by position
    pub expected_headers: Vec<String>,
    /// Leading rows that must have text
    pub sample_rows: usize,
}

impl TableSpec {
    /// Table with `table` / `thead th` / `tbody tr` selectors
    #[must_use]
    pub fn html(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            container: LocatorSpec::single(format!("{name} table"), Selector::css("table")),
            headers: LocatorSpec::single(format!("{name} headers"), Selector::css("thead th")),
            rows: LocatorSpec::single(format!("{name} rows"), Selector::css("tbody tr")),
            name,
            expected_headers: Vec::new(),
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }

    /// Set expected headers
    #[must_use]
    pub fn with_expected_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the body-row locator
    #[must_use]
    pub fn with_rows(mut self, rows: LocatorSpec) -> Self {
        self.rows = rows;
        self
    }

    /// Set number of sampled rows
    #[must_use]
    pub const fn with_sample_rows(mut self, sample_rows: usize) -> Self {
        self.sample_rows = sample_rows;
        self
    }
}

/// What `verify_table` read
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    /// Header cells
    pub headers: Vec<ElementHandle>,
    /// Trimmed header texts
    pub header_texts: Vec<String>,
    /// Body rows
    pub rows: Vec<ElementHandle>,
}

impl TableSnapshot {
    /// Number of body rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

// =============================================================================
// BOUND PAGE
// =============================================================================

/// A page model bound to a session
#[derive(Debug, Clone)]
pub struct BoundPage {
    session: Session,
    model: Arc<PageModel>,
}

impl BoundPage {
    /// Bind a model to a session
    #[must_use]
    pub fn new(session: Session, model: PageModel) -> Self {
        Self {
            session,
            model: Arc::new(model),
        }
    }

    /// Session
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Model
    #[must_use]
    pub fn model(&self) -> &PageModel {
        &self.model
    }

    /// Locator for an element name
    pub fn spec(&self, name: &str) -> PageResult<&LocatorSpec> {
        self.model.locator(name)
    }

    /// Start a journaled action
    #[must_use]
    pub fn action(&self, name: &str) -> ActionScope<'_> {
        ActionScope {
            page: self,
            handle: self.session.journal().begin(self.model.name(), name),
        }
    }

    /// Navigate to the page (menu first, then direct URL); returns final URL
    pub async fn navigate(&self) -> PageResult<String> {
        let scope = self.action("navigate");
        let result = scope.navigate().await;
        scope.finish(result)
    }

    /// Resolve a visible element
    pub async fn resolve(&self, name: &str) -> PageResult<ElementHandle> {
        let scope = self.action("resolve");
        let result = scope.resolve(name).await;
        scope.finish(result)
    }

    /// Fill an input and verify the value stuck
    pub async fn fill(&self, name: &str, text: &str) -> PageResult<()> {
        let scope = self.action("fill");
        let result = scope.fill(name, text).await;
        scope.finish(result)
    }

    /// Click a visible element
    pub async fn click(&self, name: &str) -> PageResult<()> {
        let scope = self.action("click");
        let result = scope.click(name).await;
        scope.finish(result)
    }

    /// Trimmed text of a visible element
    pub async fn text(&self, name: &str) -> PageResult<String> {
        let scope = self.action("text");
        let result = scope.text(name).await;
        scope.finish(result)
    }

    /// Whether an element satisfies the policy in time
    pub async fn is_present(&self, name: &str, policy: &WaitPolicy) -> PageResult<bool> {
        let scope = self.action("is_present");
        let result = match self.spec(name) {
            Ok(spec) => scope.is_present(spec, policy).await,
            Err(err) => Err(err),
        };
        scope.finish(result)
    }

    /// Wait until no alternative of an element is visible
    pub async fn wait_hidden(&self, name: &str) -> PageResult<()> {
        let scope = self.action("wait_hidden");
        let result = scope.wait_hidden(name).await;
        scope.finish(result)
    }

    /// Check the current URL matches the page pattern
    pub async fn verify_url(&self) -> PageResult<()> {
        let scope = self.action("verify_url");
        let result = scope.verify_url().await;
        scope.finish(result)
    }

    /// Wait for network idle, or only the `load` event when the page never
    /// goes quiet
    pub async fn settle(&self) -> PageResult<LoadState> {
        let scope = self.action("settle");
        let result = scope.settle().await;
        scope.finish(result)
    }

    /// Check an element is shown
    pub async fn verify_visible(&self, name: &str) -> PageResult<()> {
        let scope = self.action("verify_visible");
        let result = scope.verify_visible(name).await;
        scope.finish(result)
    }

    /// Check the document title contains `needle`
    pub async fn verify_title_contains(&self, needle: &str) -> PageResult<()> {
        let scope = self.action("verify_title");
        let result = scope.verify_title_contains(needle).await;
        scope.finish(result)
    }

    /// Check a table is populated and its headers are as expected
    pub async fn verify_table(&self, table: &TableSpec) -> PageResult<TableSnapshot> {
        let scope = self.action("verify_table");
        let result = scope.verify_table(table).await;
        scope.finish(result)
    }

    /// Screenshot into the session's screenshot directory
    pub async fn screenshot(&self, file: impl AsRef<Path>) -> PageResult<PathBuf> {
        let scope = self.action("screenshot");
        let result = scope.screenshot(file.as_ref()).await;
        scope.finish(result)
    }
}

// =============================================================================
// ACTION SCOPE
// =============================================================================

/// Steps of one journaled action.
///
/// Each step moves the action to the matching phase before it suspends.
/// Call [`finish`](Self::finish) with the action's result to close the record.
#[derive(Debug)]
pub struct ActionScope<'a> {
    page: &'a BoundPage,
    handle: ActionHandle,
}

impl<'a> ActionScope<'a> {
    /// Close the journal record and pass the result through
    pub fn finish<T>(self, result: PageResult<T>) -> PageResult<T> {
        self.handle.finish(result)
    }

    /// Enter a phase explicitly
    pub fn enter(&self, phase: ActionPhase) {
        self.handle.enter(phase);
    }

    fn session(&self) -> &'a Session {
        &self.page.session
    }

    fn default_policy(&self) -> WaitPolicy {
        self.session().policy(Condition::Visible)
    }

    /// Locator for an element name
    pub fn spec(&self, name: &str) -> PageResult<&'a LocatorSpec> {
        self.page.model.locator(name)
    }

    /// Resolve a visible element with the session's default timing
    pub async fn resolve(&self, name: &str) -> PageResult<ElementHandle> {
        self.resolve_spec(self.spec(name)?, &self.default_policy()).await
    }

    /// Resolve a spec under a policy
    pub async fn resolve_spec(&self, spec: &LocatorSpec, policy: &WaitPolicy) -> PageResult<ElementHandle> {
        self.enter(ActionPhase::Resolving);
        self.session().locator().resolve(spec, policy).await
    }

    /// Resolve every match of the winning alternative
    pub async fn resolve_all(&self, spec: &LocatorSpec, policy: &WaitPolicy) -> PageResult<Vec<ElementHandle>> {
        self.enter(ActionPhase::Resolving);
        self.session().locator().resolve_all(spec, policy).await
    }

    /// Fill a named input, verifying the value stuck
    pub async fn fill(&self, name: &str, text: &str) -> PageResult<()> {
        let handle = self.resolve(name).await?;
        self.fill_handle(name, &handle, text).await
    }

    /// Fill a resolved input, verifying the value stuck
    pub async fn fill_handle(&self, subject: &str, handle: &ElementHandle, text: &str) -> PageResult<()> {
        let driver = self.session().driver();
        self.enter(ActionPhase::Interacting);
        self.session().guarded(driver.fill(handle, text)).await?;
        self.enter(ActionPhase::Verifying);
        let actual = self.session().guarded(driver.input_value(handle)).await?;
        if actual == text {
            Ok(())
        } else {
            Err(PageError::assertion(
                format!("value of {subject}"),
                format!("{} characters as filled", text.chars().count()),
                format!("{} characters", actual.chars().count()),
            ))
        }
    }

    /// Click a named visible element
    pub async fn click(&self, name: &str) -> PageResult<()> {
        let handle = self.resolve(name).await?;
        self.click_handle(&handle).await
    }

    /// Click a resolved element
    pub async fn click_handle(&self, handle: &ElementHandle) -> PageResult<()> {
        self.enter(ActionPhase::Interacting);
        tracing::debug!(page = self.page.model.name(), element = %handle, "click");
        self.session().guarded(self.session().driver().click(handle)).await
    }

    /// Trimmed text of a named visible element
    pub async fn text(&self, name: &str) -> PageResult<String> {
        let handle = self.resolve(name).await?;
        self.enter(ActionPhase::Verifying);
        let text = self
            .session()
            .guarded(self.session().driver().text(&handle))
            .await?;
        Ok(text.trim().to_string())
    }

    /// Navigate the driver to an absolute URL
    pub async fn goto(&self, url: &str) -> PageResult<()> {
        self.enter(ActionPhase::Interacting);
        self.session().goto(url).await
    }

    /// Wait for a page-level condition
    pub async fn wait_until(&self, policy: &WaitPolicy) -> PageResult<WaitResult> {
        self.enter(ActionPhase::Waiting);
        self.session().wait_until(policy).await
    }

    /// Wait for the URL to match, returning it
    pub async fn wait_for_url(&self, pattern: &UrlPattern, policy: &WaitPolicy) -> PageResult<String> {
        let policy = policy.with_condition(Condition::UrlMatches(pattern.clone()));
        let result = self.wait_until(&policy).await?;
        Ok(result.url.unwrap_or_default())
    }

    /// Whether a spec resolves under the policy. Only wait failures mean
    /// "absent"; anything else propagates.
    pub async fn is_present(&self, spec: &LocatorSpec, policy: &WaitPolicy) -> PageResult<bool> {
        match self.resolve_spec(spec, policy).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_wait_failure() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Look for transient UI (a toast) whose absence is not a failure.
    /// Logs and returns `false` when it never shows.
    pub async fn observe_optional(&self, spec: &LocatorSpec, timeout: Duration) -> PageResult<bool> {
        let policy = self.session().policy_with_timeout(Condition::Visible, timeout)?;
        let seen = self.is_present(spec, &policy).await?;
        if seen {
            tracing::info!(page = self.page.model.name(), element = spec.name(), "observed");
        } else {
            tracing::warn!(
                page = self.page.model.name(),
                element = spec.name(),
                timeout_ms = policy.timeout_ms(),
                "optional element never appeared, continuing"
            );
        }
        Ok(seen)
    }

    /// Wait until a named element is hidden
    pub async fn wait_hidden(&self, name: &str) -> PageResult<()> {
        self.wait_hidden_spec(self.spec(name)?).await
    }

    /// Wait until a spec has no visible match
    pub async fn wait_hidden_spec(&self, spec: &LocatorSpec) -> PageResult<()> {
        self.enter(ActionPhase::Waiting);
        let policy = self.session().policy(Condition::Hidden);
        self.session().locator().wait_hidden(spec, &policy).await
    }

    /// Wait until a visible match of the locator lacks the `disabled` attribute
    pub async fn wait_enabled(&self, spec: &LocatorSpec) -> PageResult<ElementHandle> {
        self.enter(ActionPhase::Waiting);
        let policy = self.session().policy(Condition::Visible);
        let session = self.session();
        let waited_for = format!("'{}' enabled", spec.name());
        poll_until(&policy, session.cancel_token(), &waited_for, || async move {
            for handle in session.locator().visible_matches(spec).await? {
                if session.driver().attribute(&handle, "disabled").await?.is_none() {
                    return Ok(Some(handle));
                }
            }
            Ok(None)
        })
        .await
    }

    /// Check a named element is shown but carries the `disabled` attribute
    pub async fn verify_disabled(&self, name: &str) -> PageResult<()> {
        let handle = self.resolve(name).await?;
        self.enter(ActionPhase::Verifying);
        let disabled = self
            .session()
            .guarded(self.session().driver().attribute(&handle, "disabled"))
            .await?;
        if disabled.is_some() {
            Ok(())
        } else {
            Err(PageError::assertion(name, "disabled", "enabled"))
        }
    }

    /// Trimmed text of a resolved element, read now
    pub async fn handle_text(&self, handle: &ElementHandle) -> PageResult<String> {
        self.enter(ActionPhase::Verifying);
        let text = self
            .session()
            .guarded(self.session().driver().text(handle))
            .await?;
        Ok(text.trim().to_string())
    }

    /// Current value of a named visible input
    pub async fn input_value(&self, name: &str) -> PageResult<String> {
        let handle = self.resolve(name).await?;
        self.enter(ActionPhase::Verifying);
        self.session()
            .guarded(self.session().driver().input_value(&handle))
            .await
    }

    /// Wait for the network to go quiet, settling for the `load` event on
    /// pages that keep polling. Returns the state that was reached.
    pub async fn settle(&self) -> PageResult<LoadState> {
        let idle = self.session().policy(Condition::network_idle());
        let load = idle.with_condition(Condition::Loaded(LoadState::Load));
        let (idle, load) = (&idle, &load);
        let strategies = vec![
            Strategy::new(LoadState::NetworkIdle.event_name(), move || async move {
                self.wait_until(idle).await.map(|_| LoadState::NetworkIdle)
            }),
            Strategy::new(LoadState::Load.event_name(), move || async move {
                self.wait_until(load).await.map(|_| LoadState::Load)
            }),
        ];
        attempt_in_order(strategies)
            .await
            .map(|attempt| attempt.value)
            .map_err(|err| {
                err.into_page_error(|message| PageError::Timeout {
                    condition: format!("{} on {}", Condition::network_idle(), self.page.model.name()),
                    timeout_ms: idle.timeout_ms() + load.timeout_ms(),
                    last_error: Some(message),
                })
            })
    }

    /// Check the current URL matches the page pattern
    pub async fn verify_url(&self) -> PageResult<()> {
        self.enter(ActionPhase::Verifying);
        let url = self.session().current_url().await?;
        AssertionHelper::assert_url_matches(&url, self.page.model.url_pattern())
    }

    /// Check the document title contains `needle`
    pub async fn verify_title_contains(&self, needle: &str) -> PageResult<()> {
        self.enter(ActionPhase::Verifying);
        let title = self
            .session()
            .guarded(self.session().driver().title())
            .await?;
        AssertionHelper::assert_contains("document title", &title, needle)
    }

    /// Check a named element's text equals `expected`
    pub async fn verify_text(&self, name: &str, expected: &str) -> PageResult<()> {
        let actual = self.text(name).await?;
        AssertionHelper::assert_text_equals(name, &actual, expected)
    }

    /// Check a named element's text contains `needle`
    pub async fn verify_text_contains(&self, name: &str, needle: &str) -> PageResult<()> {
        let actual = self.text(name).await?;
        AssertionHelper::assert_contains(name, &actual, needle)
    }

    /// Check a named element's attribute equals `expected`
    pub async fn verify_attribute(&self, name: &str, attribute: &str, expected: &str) -> PageResult<()> {
        let handle = self.resolve(name).await?;
        self.enter(ActionPhase::Verifying);
        let driver = self.session().driver();
        let actual = self
            .session()
            .guarded(driver.attribute(&handle, attribute))
            .await?;
        AssertionHelper::assert_attribute_value(name, attribute, actual.as_deref(), expected)
    }

    /// Check a named element is visible
    pub async fn verify_visible(&self, name: &str) -> PageResult<()> {
        let handle = self.resolve(name).await?;
        self.enter(ActionPhase::Verifying);
        AssertionHelper::assert_visible(&handle)
    }

    /// Check how many elements a spec currently matches
    pub async fn verify_count(&self, spec: &LocatorSpec, predicate: CountPredicate) -> PageResult<usize> {
        self.enter(ActionPhase::Verifying);
        let count = self.session().locator().count(spec).await?;
        AssertionHelper::assert_count(spec.name(), count, predicate)?;
        Ok(count)
    }

    /// Screenshot into the session's screenshot directory; returns the path
    pub async fn screenshot(&self, file: &Path) -> PageResult<PathBuf> {
        self.enter(ActionPhase::Interacting);
        let path = self.session().screenshot_path(file);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        self.session()
            .guarded(self.session().driver().screenshot(&path))
            .await?;
        tracing::info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }

    /// Menu first, direct URL second. Pages without a menu go direct.
    pub async fn navigate(&self) -> PageResult<String> {
        let model = &self.page.model;
        let session = self.session();
        let full = session.policy(Condition::Visible);
        let menu_timeout = model.menu_timeout().min(full.timeout());
        let short = full.with_timeout(menu_timeout)?;
        let target = session.url(model.path());

        let mut strategies: Vec<Strategy<'_, String>> = Vec::with_capacity(2);
        if let Some(menu) = model.menu() {
            let spec = self.spec(menu)?;
            let short = &short;
            strategies.push(Strategy::new("menu", move || async move {
                let handle = self.resolve_spec(spec, short).await?;
                self.click_handle(&handle).await?;
                self.wait_for_url(model.url_pattern(), short).await
            }));
        }
        let full = &full;
        let target_ref = &target;
        strategies.push(Strategy::new("direct URL", move || async move {
            self.goto(target_ref).await?;
            self.wait_for_url(model.url_pattern(), full).await
        }));

        attempt_in_order(strategies)
            .await
            .map(|attempt| attempt.value)
            .map_err(|err| {
                err.into_page_error(|message| PageError::Navigation {
                    target: format!("{} ({target})", model.name()),
                    message,
                })
            })
    }

    /// Container, then headers, then rows.
    ///
    /// No header cells or no body rows is [`PageError::TableNotPopulated`];
    /// a header text mismatch or an empty sampled row is an assertion error.
    /// Headers are checked before rows are awaited, so a table with wrong
    /// headers and no rows fails with the header assertion.
    pub async fn verify_table(&self, table: &TableSpec) -> PageResult<TableSnapshot> {
        let session = self.session();
        let driver = session.driver();
        let policy = session.policy(Condition::Visible);

        self.resolve_spec(&table.container, &policy).await?;

        let headers = match self.resolve_all(&table.headers, &policy).await {
            Ok(headers) => headers,
            Err(err) if err.is_wait_failure() => {
                return Err(PageError::TableNotPopulated {
                    table: table.name.clone(),
                    header_count: 0,
                    row_count: session.locator().count(&table.rows).await?,
                })
            }
            Err(err) => return Err(err),
        };

        self.enter(ActionPhase::Verifying);
        let mut header_texts = Vec::with_capacity(headers.len());
        for header in &headers {
            header_texts.push(session.guarded(driver.text(header)).await?.trim().to_string());
        }
        for (i, expected) in table.expected_headers.iter().enumerate() {
            let subject = format!("table '{}' header[{i}]", table.name);
            match header_texts.get(i) {
                Some(actual) => AssertionHelper::assert_text_equals(&subject, actual, expected)?,
                None => {
                    return Err(PageError::assertion(
                        subject,
                        format!("{expected:?}"),
                        format!("only {} header cells", header_texts.len()),
                    ))
                }
            }
        }

        let rows = match self.resolve_all(&table.rows, &policy).await {
            Ok(rows) => rows,
            Err(err) if err.is_wait_failure() => {
                return Err(PageError::TableNotPopulated {
                    table: table.name.clone(),
                    header_count: headers.len(),
                    row_count: 0,
                })
            }
            Err(err) => return Err(err),
        };

        self.enter(ActionPhase::Verifying);
        for (i, row) in rows.iter().take(table.sample_rows).enumerate() {
            let text = session.guarded(driver.text(row)).await?;
            if text.trim().is_empty() {
                return Err(PageError::assertion(
                    format!("table '{}' row[{i}]", table.name),
                    "non-empty text",
                    "\"\"",
                ));
            }
        }

        tracing::debug!(
            table = %table.name,
            headers = headers.len(),
            rows = rows.len(),
            "table verified"
        );
        Ok(TableSnapshot {
            headers,
            header_texts,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::driver::Driver;
    use crate::mock::{MockDriver, MockEffect, MockElement, MockPage};
    use tokio::time::Instant;

    const BASE: &str = "https://app.test";

    fn session(driver: &Arc<MockDriver>) -> Session {
        Session::new(
            Arc::clone(driver) as Arc<dyn Driver>,
            SessionConfig::new()
                .with_base_url(BASE)
                .with_timeout_ms(2000)
                .with_poll_interval_ms(100),
        )
        .unwrap()
    }

    fn reports_model() -> PageModel {
        PageModel::builder("reports")
            .with_path("/reports")
            .with_url_regex(r".*/reports$")
            .with_selectors("menu", r#"a:has-text("Reports"), button:has-text("Reports")"#)
            .with_selectors("search", r#"input[placeholder="Search reports"]"#)
            .with_menu("menu")
            .with_menu_timeout(Duration::from_millis(500))
            .build()
            .unwrap()
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_builder_basic() {
            let model = reports_model();
            assert_eq!(model.name(), "reports");
            assert_eq!(model.path(), "/reports");
            assert_eq!(model.menu(), Some("menu"));
            assert_eq!(model.element_names(), vec!["menu", "search"]);
            assert_eq!(model.locator("menu").unwrap().alternatives().len(), 2);
        }

        #[test]
        fn test_default_url_pattern_from_path() {
            let model = PageModel::builder("login").with_path("/login").build().unwrap();
            assert!(model.url_pattern().matches("https://x.test/login?next=/"));
            assert!(!model.url_pattern().matches("https://login.x.test/dashboard"));
        }

        #[test]
        fn test_path_regex_pattern() {
            let model = PageModel::builder("details")
                .with_path_regex(r"^/reports/\d+$")
                .build()
                .unwrap();
            assert!(model.url_pattern().matches("https://reports.test/reports/7"));
            assert!(!model.url_pattern().matches("https://reports.test/reports"));
            let err = PageModel::builder("p").with_path_regex("(").build().unwrap_err();
            assert!(matches!(err, PageError::Config { .. }));
        }

        #[test]
        fn test_duplicate_names_rejected() {
            let err = PageModel::builder("p")
                .with_selectors("a", "#a")
                .with_selectors("a", "#b")
                .build()
                .unwrap_err();
            assert!(err.to_string().contains("duplicate element name 'a'"));
        }

        #[test]
        fn test_unknown_menu_rejected() {
            let err = PageModel::builder("p").with_menu("nav").build().unwrap_err();
            assert!(matches!(err, PageError::InvalidPage { .. }));
        }

        #[test]
        fn test_parse_error_surfaces_at_build() {
            let err = PageModel::builder("p")
                .with_selectors("a", "")
                .build()
                .unwrap_err();
            assert!(matches!(err, PageError::InvalidLocator { .. }));
            let err = PageModel::builder("p").with_url_regex("(").build().unwrap_err();
            assert!(matches!(err, PageError::Config { .. }));
        }

        #[test]
        fn test_explicit_locator_and_pattern() {
            let model = PageModel::builder("details")
                .with_path("/reports/42")
                .with_url_pattern(UrlPattern::Prefix("https://app.test/reports/".to_string()))
                .with_locator(LocatorSpec::single("title", Selector::css("h1")))
                .build()
                .unwrap();
            assert!(model.url_pattern().matches("https://app.test/reports/7"));
            assert_eq!(model.locator("title").unwrap().alternatives(), &[Selector::css("h1")]);
        }

        #[test]
        fn test_unknown_element_lookup() {
            let err = reports_model().locator("nope").unwrap_err();
            assert_eq!(err.to_string(), "page 'reports': no element named 'nope'");
        }
    }

    mod navigate_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_menu_navigation() {
            let driver = Arc::new(
                MockDriver::new()
                    .with_page(
                        MockPage::new(format!("{BASE}/home")).with_element(
                            MockElement::new("a", &["a"])
                                .with_text("Reports")
                                .visible()
                                .on_click(MockEffect::Navigate(format!("{BASE}/reports"))),
                        ),
                    )
                    .with_page(MockPage::new(format!("{BASE}/reports"))),
            );
            driver.navigate(&format!("{BASE}/home")).await.unwrap();
            let page = BoundPage::new(session(&driver), reports_model());

            let url = page.navigate().await.unwrap();
            assert_eq!(url, format!("{BASE}/reports"));
            assert_eq!(driver.call_count("navigate:"), 1);
            assert!(driver.was_called("click:"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_falls_back_to_direct_url() {
            let driver = Arc::new(MockDriver::new().with_page(MockPage::new(format!("{BASE}/reports"))));
            driver.navigate(&format!("{BASE}/home")).await.unwrap();
            let page = BoundPage::new(session(&driver), reports_model());

            let start = Instant::now();
            let url = page.navigate().await.unwrap();
            assert_eq!(url, format!("{BASE}/reports"));
            assert!(driver.was_called("navigate:https://app.test/reports"));
            // menu attempt bounded by the menu timeout
            assert!(start.elapsed() <= Duration::from_millis(600));
        }

        #[tokio::test(start_paused = true)]
        async fn test_both_strategies_fail() {
            // direct URL lands somewhere else
            let driver = Arc::new(MockDriver::new().with_page(
                MockPage::new(format!("{BASE}/reports"))
                    .redirects_after(Duration::ZERO, format!("{BASE}/login")),
            ));
            driver.navigate(&format!("{BASE}/home")).await.unwrap();
            let page = BoundPage::new(session(&driver), reports_model());

            let err = page.navigate().await.unwrap_err();
            match &err {
                PageError::Navigation { target, message } => {
                    assert!(target.contains("reports"));
                    assert!(message.contains("menu: element 'menu' not found"));
                    assert!(message.contains("direct URL: timed out"));
                }
                other => panic!("expected navigation error, got {other}"),
            }
            let record = page.session().journal().last().unwrap();
            assert_eq!(record.action, "navigate");
            assert!(!record.succeeded());
        }

        #[tokio::test(start_paused = true)]
        async fn test_cancel_during_navigation() {
            let driver = Arc::new(MockDriver::new());
            driver.navigate(&format!("{BASE}/home")).await.unwrap();
            let page = BoundPage::new(session(&driver), reports_model());
            let session = page.session().clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                session.cancel();
            });

            let err = page.navigate().await.unwrap_err();
            assert!(matches!(err, PageError::Cancelled));
            // direct strategy never started
            assert_eq!(driver.call_count("navigate:"), 1);
        }
    }

    mod action_tests {
        use super::*;

        async fn form_page(driver: &Arc<MockDriver>) -> BoundPage {
            driver.navigate(&format!("{BASE}/reports")).await.unwrap();
            let model = PageModel::builder("form")
                .with_path("/reports")
                .with_selectors("name", "#name")
                .with_selectors("short", "#short")
                .with_selectors("toast", r#"text="Saved!""#)
                .build()
                .unwrap();
            BoundPage::new(session(driver), model)
        }

        fn form_driver() -> Arc<MockDriver> {
            Arc::new(
                MockDriver::new().with_page(
                    MockPage::new(format!("{BASE}/reports"))
                        .with_title("Reports | Example")
                        .with_element(MockElement::new("input", &["#name"]).with_id("name").visible())
                        .with_element(
                            MockElement::new("input", &["#short"])
                                .with_attribute("maxlength", "2")
                                .visible(),
                        ),
                ),
            )
        }

        async fn busy_page(page: MockPage) -> BoundPage {
            let driver = Arc::new(MockDriver::new().with_page(page));
            driver.navigate(&format!("{BASE}/reports")).await.unwrap();
            BoundPage::new(session(&driver), PageModel::builder("busy").build().unwrap())
        }

        #[tokio::test(start_paused = true)]
        async fn test_settle_reaches_network_idle() {
            let page = busy_page(
                MockPage::new(format!("{BASE}/reports")).with_network_activity(Duration::from_millis(300)),
            )
            .await;
            assert_eq!(page.settle().await.unwrap(), LoadState::NetworkIdle);
        }

        #[tokio::test(start_paused = true)]
        async fn test_settle_falls_back_to_load_on_chatty_page() {
            let page = busy_page(
                MockPage::new(format!("{BASE}/reports")).with_network_activity(Duration::from_secs(60)),
            )
            .await;
            let start = Instant::now();
            assert_eq!(page.settle().await.unwrap(), LoadState::Load);
            // one full idle timeout, then load is immediate
            assert!(start.elapsed() >= Duration::from_millis(2000));
            assert!(start.elapsed() < Duration::from_millis(2500));
        }

        #[tokio::test(start_paused = true)]
        async fn test_settle_never_loaded_is_timeout() {
            let page = busy_page(
                MockPage::new(format!("{BASE}/reports")).with_load_delay(Duration::from_secs(60)),
            )
            .await;
            match page.settle().await.unwrap_err() {
                PageError::Timeout {
                    timeout_ms,
                    last_error,
                    ..
                } => {
                    assert_eq!(timeout_ms, 4000);
                    let failures = last_error.unwrap();
                    assert!(failures.contains("networkidle:"));
                    assert!(failures.contains("load:"));
                }
                other => panic!("expected Timeout, got {other}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_verify_disabled() {
            let driver = Arc::new(
                MockDriver::new().with_page(
                    MockPage::new(format!("{BASE}/reports"))
                        .with_element(
                            MockElement::new("button", &["#next"])
                                .with_attribute("disabled", "")
                                .visible(),
                        )
                        .with_element(MockElement::new("button", &["#back"]).visible()),
                ),
            );
            driver.navigate(&format!("{BASE}/reports")).await.unwrap();
            let model = PageModel::builder("wizard")
                .with_selectors("next", "#next")
                .with_selectors("back", "#back")
                .build()
                .unwrap();
            let page = BoundPage::new(session(&driver), model);
            let scope = page.action("check buttons");
            scope.verify_disabled("next").await.unwrap();
            let err = scope.verify_disabled("back").await.unwrap_err();
            assert!(matches!(err, PageError::Assertion { ref subject, .. } if subject == "back"));
            scope.finish(Ok(())).unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_count_and_text_contains() {
            let driver = Arc::new(
                MockDriver::new().with_page(
                    MockPage::new(format!("{BASE}/reports"))
                        .with_element(MockElement::new("li", &["li"]).with_text("Office").visible())
                        .with_element(MockElement::new("li", &["li"]).with_text("Lab").visible()),
                ),
            );
            driver.navigate(&format!("{BASE}/reports")).await.unwrap();
            let model = PageModel::builder("list")
                .with_path("/reports")
                .with_selectors("first", "li")
                .build()
                .unwrap();
            let page = BoundPage::new(session(&driver), model);
            let scope = page.action("check list");

            let items = LocatorSpec::single("items", Selector::css("li"));
            assert_eq!(scope.verify_count(&items, CountPredicate::Exactly(2)).await.unwrap(), 2);
            let err = scope.verify_count(&items, CountPredicate::AtLeast(3)).await.unwrap_err();
            assert!(matches!(err, PageError::Assertion { .. }));
            scope.verify_text_contains("first", "Off").await.unwrap();
            assert!(scope.verify_text_contains("first", "Lab").await.is_err());
            scope.finish(Ok(())).unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_fill_reads_back_value() {
            let driver = form_driver();
            let page = form_page(&driver).await;
            page.fill("name", "Office").await.unwrap();
            assert_eq!(driver.value_of("name").as_deref(), Some("Office"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_fill_detects_silent_truncation() {
            let driver = form_driver();
            let page = form_page(&driver).await;
            let err = page.fill("short", "abcdef").await.unwrap_err();
            assert!(matches!(err, PageError::Assertion { .. }));
            assert!(!err.to_string().contains("abcdef"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_observe_optional_tolerates_absence() {
            let driver = form_driver();
            let page = form_page(&driver).await;
            let scope = page.action("save");
            let start = Instant::now();
            let seen = scope
                .observe_optional(page.spec("toast").unwrap(), Duration::from_millis(500))
                .await
                .unwrap();
            assert!(!seen);
            assert!(start.elapsed() <= Duration::from_millis(500));
            scope.finish(Ok(())).unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_verify_url_and_title() {
            let driver = form_driver();
            let page = form_page(&driver).await;
            page.verify_url().await.unwrap();
            page.verify_title_contains("Reports").await.unwrap();
            let err = page.verify_title_contains("Kaiterra").await.unwrap_err();
            assert_eq!(err.kind(), crate::FailureKind::Assertion);
        }

        #[tokio::test]
        async fn test_screenshot_into_configured_dir() {
            let dir = tempfile::tempdir().unwrap();
            let driver = form_driver();
            driver.navigate(&format!("{BASE}/reports")).await.unwrap();
            let session = Session::new(
                Arc::clone(&driver) as Arc<dyn Driver>,
                SessionConfig::new()
                    .with_base_url(BASE)
                    .with_screenshot_dir(dir.path().join("shots")),
            )
            .unwrap();
            let page = BoundPage::new(session, PageModel::builder("form").build().unwrap());
            let path = page.screenshot("form.png").await.unwrap();
            assert_eq!(path, dir.path().join("shots").join("form.png"));
            assert!(path.exists());
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_enabled() {
            let driver = Arc::new(
                MockDriver::new().with_page(
                    MockPage::new(format!("{BASE}/reports"))
                        .with_element(
                            MockElement::new("button", &["button"])
                                .with_id("submit")
                                .with_text("Create report")
                                .with_attribute("disabled", "")
                                .visible(),
                        )
                        .with_element(
                            MockElement::new("li", &["li"])
                                .with_text("Building")
                                .visible()
                                .on_click(MockEffect::SetAttribute {
                                    id: "submit".to_string(),
                                    name: "disabled".to_string(),
                                    value: None,
                                }),
                        ),
                ),
            );
            let page = form_page(&driver).await;
            let scope = page.action("create");
            let button = LocatorSpec::single("submit", Selector::has_text("button", "Create report"));

            let err = scope.wait_enabled(&button).await.unwrap_err();
            assert!(matches!(err, PageError::Timeout { .. }));

            let option = driver.query_all(&Selector::css("li")).await.unwrap().remove(0);
            driver.click(&option).await.unwrap();
            let handle = scope.wait_enabled(&button).await.unwrap();
            assert_eq!(handle.text, "Create report");
            scope.finish(Ok(())).unwrap();
        }
    }

    mod table_tests {
        use super::*;

        fn table_driver(rows: &[&str]) -> Arc<MockDriver> {
            let mut page = MockPage::new(format!("{BASE}/reports"))
                .with_element(MockElement::new("table", &["table"]).visible())
                .with_element(MockElement::new("th", &["thead th"]).with_text("Name").visible())
                .with_element(
                    MockElement::new("th", &["thead th"])
                        .with_text(" Status (Last 30 days) ")
                        .visible(),
                );
            for row in rows {
                page = page.with_element(MockElement::new("tr", &["tbody tr"]).with_text(*row).visible());
            }
            Arc::new(MockDriver::new().with_page(page))
        }

        async fn bound(driver: &Arc<MockDriver>) -> BoundPage {
            driver.navigate(&format!("{BASE}/reports")).await.unwrap();
            BoundPage::new(session(driver), PageModel::builder("reports").build().unwrap())
        }

        fn spec() -> TableSpec {
            TableSpec::html("reports").with_expected_headers(["Name", "Status (Last 30 days)"])
        }

        #[tokio::test(start_paused = true)]
        async fn test_populated_table() {
            let driver = table_driver(&["Office", "Lab", "Warehouse", "Annex"]);
            let snapshot = bound(&driver).await.verify_table(&spec()).await.unwrap();
            assert_eq!(snapshot.header_texts, vec!["Name", "Status (Last 30 days)"]);
            assert_eq!(snapshot.row_count(), 4);
        }

        #[tokio::test(start_paused = true)]
        async fn test_zero_rows_not_populated() {
            let driver = table_driver(&[]);
            let err = bound(&driver).await.verify_table(&spec()).await.unwrap_err();
            match err {
                PageError::TableNotPopulated {
                    header_count,
                    row_count,
                    ..
                } => {
                    assert_eq!(header_count, 2);
                    assert_eq!(row_count, 0);
                }
                other => panic!("expected TableNotPopulated, got {other}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_header_mismatch_is_assertion() {
            let driver = table_driver(&["Office"]);
            let table = TableSpec::html("reports").with_expected_headers(["Name", "Status"]);
            let err = bound(&driver).await.verify_table(&table).await.unwrap_err();
            assert!(matches!(err, PageError::Assertion { ref subject, .. } if subject.ends_with("header[1]")));
        }

        #[tokio::test(start_paused = true)]
        async fn test_header_mismatch_wins_over_empty_body() {
            let driver = table_driver(&[]);
            let table = TableSpec::html("reports").with_expected_headers(["Building", "Status"]);
            let err = bound(&driver).await.verify_table(&table).await.unwrap_err();
            assert!(matches!(err, PageError::Assertion { ref subject, .. } if subject.ends_with("header[0]")));
        }

        #[tokio::test(start_paused = true)]
        async fn test_blank_sample_row_is_assertion() {
            let driver = table_driver(&["Office", "   ", "Lab"]);
            let err = bound(&driver).await.verify_table(&spec()).await.unwrap_err();
            assert!(err.to_string().contains("row[1]"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_only_sampled_rows_checked() {
            let driver = table_driver(&["Office", "   ", "Lab"]);
            let table = spec().with_sample_rows(1);
            let snapshot = bound(&driver).await.verify_table(&table).await.unwrap();
            assert_eq!(snapshot.row_count(), 3);
        }

        #[tokio::test(start_paused = true)]
        async fn test_custom_row_locator() {
            let driver = table_driver(&["Office"]);
            let table = spec().with_rows(LocatorSpec::single("rows", Selector::css("tr.report")));
            let err = bound(&driver).await.verify_table(&table).await.unwrap_err();
            assert!(matches!(err, PageError::TableNotPopulated { row_count: 0, .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_container_is_not_found() {
            let driver = Arc::new(MockDriver::new());
            let err = bound(&driver).await.verify_table(&spec()).await.unwrap_err();
            assert!(matches!(err, PageError::NotFound { .. }));
        }
    }
}
