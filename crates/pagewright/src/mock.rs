//! Scriptable in-memory driver for unit and integration tests.
//!
//! A [`MockDriver`] serves [`MockPage`]s keyed by URL. Elements answer to CSS
//! "keys" (the literal selector strings a page object uses), may appear some
//! time after the page loads, and can navigate or toggle other elements when
//! clicked or filled. All timing uses `tokio::time`, so tests run on a paused
//! clock.

use crate::driver::{DocumentState, Driver, ElementHandle, ReadyState};
use crate::locator::Selector;
use crate::result::{PageError, PageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

const BLANK: &str = "about:blank";
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const MAX_PARENT_DEPTH: usize = 32;

/// Side effect of clicking or filling a mock element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEffect {
    /// Load another page
    Navigate(String),
    /// Make the element with this id visible
    Show(String),
    /// Make the element with this id invisible
    Hide(String),
    /// Detach the element with this id
    Remove(String),
    /// Set an attribute on the element with this id
    SetAttribute {
        /// Target element id
        id: String,
        /// Attribute name
        name: String,
        /// New value, `None` removes the attribute
        value: Option<String>,
    },
    /// Compare two input values against accepted credentials
    SubmitCredentials {
        /// Id of the email input
        email_field: String,
        /// Id of the password input
        password_field: String,
        /// Accepted email
        email: String,
        /// Accepted password
        password: String,
        /// Page loaded when the credentials match
        success_url: String,
        /// Element shown when they do not
        error_id: Option<String>,
    },
}

/// One element on a mock page
#[derive(Debug, Clone)]
pub struct MockElement {
    tag: String,
    keys: Vec<String>,
    id: Option<String>,
    parent: Option<String>,
    text: String,
    value: String,
    visible: bool,
    attributes: HashMap<String, String>,
    appears_after: Option<Duration>,
    on_click: Vec<MockEffect>,
    on_fill: Vec<MockEffect>,
}

impl MockElement {
    /// Create a hidden element answering to the given CSS keys
    #[must_use]
    pub fn new(tag: impl Into<String>, keys: &[&str]) -> Self {
        Self {
            tag: tag.into(),
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
            id: None,
            parent: None,
            text: String::new(),
            value: String::new(),
            visible: false,
            attributes: HashMap::new(),
            appears_after: None,
            on_click: Vec::new(),
            on_fill: Vec::new(),
        }
    }

    /// Mark visible
    #[must_use]
    pub const fn visible(mut self) -> Self {
        self.visible = true;
        self
    }

    /// Set the id effects refer to
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Nest under the element with this id; hidden parents hide children
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute. `maxlength` truncates filled values.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attach only after the page has been loaded this long
    #[must_use]
    pub const fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = Some(delay);
        self
    }

    /// Add a click effect
    #[must_use]
    pub fn on_click(mut self, effect: MockEffect) -> Self {
        self.on_click.push(effect);
        self
    }

    /// Add a fill effect
    #[must_use]
    pub fn on_fill(mut self, effect: MockEffect) -> Self {
        self.on_fill.push(effect);
        self
    }

    fn answers_to(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

/// A page the mock driver can load
#[derive(Debug, Clone)]
pub struct MockPage {
    url: String,
    title: String,
    elements: Vec<MockElement>,
    load_delay: Duration,
    network_activity: Duration,
    redirect: Option<(Duration, String)>,
}

impl MockPage {
    /// Create an empty, instantly loaded page
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            elements: Vec::new(),
            load_delay: Duration::ZERO,
            network_activity: Duration::ZERO,
            redirect: None,
        }
    }

    /// Set document title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add an element, in document order
    #[must_use]
    pub fn with_element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Document stays `loading` this long after navigation
    #[must_use]
    pub const fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Page keeps requesting resources (one per 100ms) for this long
    #[must_use]
    pub const fn with_network_activity(mut self, duration: Duration) -> Self {
        self.network_activity = duration;
        self
    }

    /// Client-side redirect after a delay
    #[must_use]
    pub fn redirects_after(mut self, delay: Duration, url: impl Into<String>) -> Self {
        self.redirect = Some((delay, url.into()));
        self
    }
}

#[derive(Debug)]
struct LoadedPage {
    page: MockPage,
    loaded_at: Instant,
}

impl LoadedPage {
    fn attached(&self, element: &MockElement, now: Instant) -> bool {
        element
            .appears_after
            .map_or(true, |delay| now >= self.loaded_at + delay)
    }

    fn find_by_id(&self, id: &str) -> Option<&MockElement> {
        self.page
            .elements
            .iter()
            .find(|e| e.id.as_deref() == Some(id))
    }

    fn is_visible(&self, element: &MockElement, now: Instant) -> bool {
        let mut current = element;
        for _ in 0..MAX_PARENT_DEPTH {
            if !current.visible || !self.attached(current, now) {
                return false;
            }
            match current.parent.as_deref().and_then(|p| self.find_by_id(p)) {
                Some(parent) => current = parent,
                None => return true,
            }
        }
        false
    }

    fn selector_matches(&self, selector: &Selector, element: &MockElement) -> bool {
        match selector {
            Selector::Css(css) => element.answers_to(css),
            Selector::HasText { css, .. } => {
                element.answers_to(css) && selector.matches_text(&element.text)
            }
            Selector::Text { .. } => !element.text.is_empty() && selector.matches_text(&element.text),
            Selector::TestId(id) => {
                element.attributes.get("data-testid") == Some(id)
                    || element.answers_to(&format!("[data-testid=\"{id}\"]"))
            }
            Selector::Scoped { scope, inner } => {
                element.answers_to(inner)
                    && element
                        .parent
                        .as_deref()
                        .and_then(|p| self.find_by_id(p))
                        .is_some_and(|parent| self.selector_matches(scope, parent))
            }
        }
    }

    /// Positions in `page.elements` of the attached matches, in order
    fn matches(&self, selector: &Selector, now: Instant) -> Vec<usize> {
        self.page
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| self.attached(e, now) && self.selector_matches(selector, e))
            .map(|(i, _)| i)
            .collect()
    }

    fn position_of(&self, handle: &ElementHandle, now: Instant) -> PageResult<usize> {
        self.matches(&handle.selector, now)
            .get(handle.index)
            .copied()
            .ok_or_else(|| PageError::driver(format!("element {handle} is detached")))
    }

    fn position_by_id(&self, id: &str) -> Option<usize> {
        self.page
            .elements
            .iter()
            .position(|e| e.id.as_deref() == Some(id))
    }
}

#[derive(Debug, Default)]
struct MockState {
    pages: HashMap<String, MockPage>,
    current: Option<LoadedPage>,
    failing: Vec<Selector>,
    history: Vec<String>,
    /// Last value typed into each element with an id, kept across loads
    typed: HashMap<String, String>,
}

impl MockState {
    fn load(&mut self, url: &str) {
        let page = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| MockPage::new(url));
        self.current = Some(LoadedPage {
            page,
            loaded_at: Instant::now(),
        });
    }

    /// Apply a due client-side redirect
    fn settle(&mut self, now: Instant) {
        let due = self.current.as_ref().and_then(|loaded| {
            loaded
                .page
                .redirect
                .as_ref()
                .filter(|(delay, _)| now >= loaded.loaded_at + *delay)
                .map(|(_, url)| url.clone())
        });
        if let Some(url) = due {
            self.load(&url);
        }
    }

    fn page(&self) -> PageResult<&LoadedPage> {
        self.current
            .as_ref()
            .ok_or_else(|| PageError::driver("no page loaded"))
    }

    fn page_mut(&mut self) -> PageResult<&mut LoadedPage> {
        self.current
            .as_mut()
            .ok_or_else(|| PageError::driver("no page loaded"))
    }

    fn element_by_id(&mut self, id: &str) -> PageResult<&mut MockElement> {
        let page = self.page_mut()?;
        let pos = page
            .position_by_id(id)
            .ok_or_else(|| PageError::driver(format!("no element with id '{id}'")))?;
        Ok(&mut page.page.elements[pos])
    }

    fn apply(&mut self, effects: Vec<MockEffect>) -> PageResult<()> {
        for effect in effects {
            match effect {
                MockEffect::Navigate(url) => {
                    self.load(&url);
                    // later effects referred to the old page
                    return Ok(());
                }
                MockEffect::Show(id) => self.element_by_id(&id)?.visible = true,
                MockEffect::Hide(id) => self.element_by_id(&id)?.visible = false,
                MockEffect::Remove(id) => {
                    let page = self.page_mut()?;
                    if let Some(pos) = page.position_by_id(&id) {
                        page.page.elements.remove(pos);
                    }
                }
                MockEffect::SetAttribute { id, name, value } => {
                    let element = self.element_by_id(&id)?;
                    match value {
                        Some(value) => {
                            element.attributes.insert(name, value);
                        }
                        None => {
                            element.attributes.remove(&name);
                        }
                    }
                }
                MockEffect::SubmitCredentials {
                    email_field,
                    password_field,
                    email,
                    password,
                    success_url,
                    error_id,
                } => {
                    let given_email = self.element_by_id(&email_field)?.value.clone();
                    let given_password = self.element_by_id(&password_field)?.value.clone();
                    if given_email == email && given_password == password {
                        self.load(&success_url);
                        return Ok(());
                    }
                    if let Some(error_id) = error_id {
                        self.element_by_id(&error_id)?.visible = true;
                    }
                }
            }
        }
        Ok(())
    }
}

/// In-memory [`Driver`] for tests
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create a driver with no pages; every URL loads an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page
    #[must_use]
    pub fn with_page(self, page: MockPage) -> Self {
        self.lock().pages.insert(page.url.clone(), page);
        self
    }

    /// Make every query for `selector` fail with a driver error
    #[must_use]
    pub fn with_failing_selector(self, selector: Selector) -> Self {
        self.lock().failing.push(selector);
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: String) {
        self.lock().history.push(call);
    }

    /// Calls made so far, e.g. `navigate:https://...`, `click:#submit[0]`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Check if a call with this prefix was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(prefix))
    }

    /// Number of calls with this prefix
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.lock()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Show an element on the current page
    pub fn show(&self, id: &str) {
        let _ = self.lock().apply(vec![MockEffect::Show(id.to_string())]);
    }

    /// Hide an element on the current page
    pub fn hide(&self, id: &str) {
        let _ = self.lock().apply(vec![MockEffect::Hide(id.to_string())]);
    }

    /// Detach an element from the current page
    pub fn remove(&self, id: &str) {
        let _ = self.lock().apply(vec![MockEffect::Remove(id.to_string())]);
    }

    /// Value of an input on the current page, by id
    #[must_use]
    pub fn value_of(&self, id: &str) -> Option<String> {
        let state = self.lock();
        let page = state.current.as_ref()?;
        page.find_by_id(id).map(|e| e.value.clone())
    }

    /// Last value typed into the element with this id, on whichever page
    /// it lived. Survives navigation, unlike [`value_of`](Self::value_of).
    #[must_use]
    pub fn typed_into(&self, id: &str) -> Option<String> {
        self.lock().typed.get(id).cloned()
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn navigate(&self, url: &str) -> PageResult<()> {
        let mut state = self.lock();
        state.history.push(format!("navigate:{url}"));
        state.load(url);
        Ok(())
    }

    async fn document_state(&self) -> PageResult<DocumentState> {
        let now = Instant::now();
        let mut state = self.lock();
        state.settle(now);
        let loaded = state.page()?;
        let since_load = now.saturating_duration_since(loaded.loaded_at);
        let ready_state = if since_load < loaded.page.load_delay {
            ReadyState::Loading
        } else {
            ReadyState::Complete
        };
        let active = since_load.min(loaded.page.network_activity);
        let resource_count = 1 + usize::try_from(active.as_millis() / 100).unwrap_or(usize::MAX);
        Ok(DocumentState {
            ready_state,
            resource_count,
        })
    }

    async fn query_all(&self, selector: &Selector) -> PageResult<Vec<ElementHandle>> {
        let now = Instant::now();
        let mut state = self.lock();
        state.settle(now);
        if state.failing.contains(selector) {
            return Err(PageError::driver(format!("query failed for {selector}")));
        }
        let Some(loaded) = state.current.as_ref() else {
            return Ok(Vec::new());
        };
        Ok(loaded
            .matches(selector, now)
            .into_iter()
            .enumerate()
            .map(|(index, pos)| {
                let element = &loaded.page.elements[pos];
                ElementHandle::new(selector.clone(), index, element.tag.clone())
                    .with_text(element.text.trim())
                    .with_visible(loaded.is_visible(element, now))
            })
            .collect())
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> PageResult<()> {
        let now = Instant::now();
        let mut state = self.lock();
        state.history.push(format!("fill:{element}"));
        let page = state.page_mut()?;
        let pos = page.position_of(element, now)?;
        if !page.is_visible(&page.page.elements[pos], now) {
            return Err(PageError::driver(format!("element {element} is not visible")));
        }
        let target = &mut page.page.elements[pos];
        target.value = match target
            .attributes
            .get("maxlength")
            .and_then(|m| m.parse::<usize>().ok())
        {
            Some(max) => text.chars().take(max).collect(),
            None => text.to_string(),
        };
        let typed = target.id.clone().map(|id| (id, target.value.clone()));
        let effects = target.on_fill.clone();
        if let Some((id, value)) = typed {
            state.typed.insert(id, value);
        }
        state.apply(effects)
    }

    async fn click(&self, element: &ElementHandle) -> PageResult<()> {
        let now = Instant::now();
        let mut state = self.lock();
        state.history.push(format!("click:{element}"));
        let page = state.page()?;
        let pos = page.position_of(element, now)?;
        let target = &page.page.elements[pos];
        if !page.is_visible(target, now) {
            return Err(PageError::driver(format!("element {element} is not visible")));
        }
        let effects = target.on_click.clone();
        state.apply(effects)
    }

    async fn text(&self, element: &ElementHandle) -> PageResult<String> {
        let now = Instant::now();
        let state = self.lock();
        let page = state.page()?;
        let pos = page.position_of(element, now)?;
        Ok(page.page.elements[pos].text.trim().to_string())
    }

    async fn input_value(&self, element: &ElementHandle) -> PageResult<String> {
        let now = Instant::now();
        let state = self.lock();
        let page = state.page()?;
        let pos = page.position_of(element, now)?;
        Ok(page.page.elements[pos].value.clone())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> PageResult<Option<String>> {
        let now = Instant::now();
        let state = self.lock();
        let page = state.page()?;
        let pos = page.position_of(element, now)?;
        Ok(page.page.elements[pos].attributes.get(name).cloned())
    }

    async fn current_url(&self) -> PageResult<String> {
        let mut state = self.lock();
        state.settle(Instant::now());
        Ok(state
            .current
            .as_ref()
            .map_or_else(|| BLANK.to_string(), |p| p.page.url.clone()))
    }

    async fn title(&self) -> PageResult<String> {
        let state = self.lock();
        Ok(state
            .current
            .as_ref()
            .map(|p| p.page.title.clone())
            .unwrap_or_default())
    }

    async fn screenshot(&self, path: &Path) -> PageResult<()> {
        self.record(format!("screenshot:{}", path.display()));
        tokio::fs::write(path, PNG_SIGNATURE).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN: &str = "https://app.test/login";
    const DASHBOARD: &str = "https://app.test/dashboard";

    fn login_page() -> MockPage {
        MockPage::new(LOGIN)
            .with_title("Sign in")
            .with_element(MockElement::new("input", &["#email"]).with_id("email").visible())
            .with_element(
                MockElement::new("input", &["#password"])
                    .with_id("password")
                    .visible(),
            )
            .with_element(
                MockElement::new("button", &["button"])
                    .with_text("Log in")
                    .visible()
                    .on_click(MockEffect::SubmitCredentials {
                        email_field: "email".to_string(),
                        password_field: "password".to_string(),
                        email: "a@b.c".to_string(),
                        password: "pw".to_string(),
                        success_url: DASHBOARD.to_string(),
                        error_id: Some("error".to_string()),
                    }),
            )
            .with_element(
                MockElement::new("div", &[".error"])
                    .with_id("error")
                    .with_text("Invalid credentials"),
            )
    }

    async fn first(driver: &MockDriver, selector: Selector) -> ElementHandle {
        driver.query_all(&selector).await.unwrap().remove(0)
    }

    #[tokio::test]
    async fn test_unknown_url_loads_empty_page() {
        let driver = MockDriver::new();
        assert_eq!(driver.current_url().await.unwrap(), BLANK);
        driver.navigate("https://nowhere.test/").await.unwrap();
        assert_eq!(driver.current_url().await.unwrap(), "https://nowhere.test/");
        assert!(driver
            .query_all(&Selector::css("body"))
            .await
            .unwrap()
            .is_empty());
        assert!(driver.was_called("navigate:https://nowhere.test/"));
    }

    #[tokio::test]
    async fn test_credentials_accepted() {
        let driver = MockDriver::new().with_page(login_page());
        driver.navigate(LOGIN).await.unwrap();

        let email = first(&driver, Selector::css("#email")).await;
        let password = first(&driver, Selector::css("#password")).await;
        driver.fill(&email, "a@b.c").await.unwrap();
        driver.fill(&password, "pw").await.unwrap();
        let submit = first(&driver, Selector::has_text("button", "log in")).await;
        driver.click(&submit).await.unwrap();

        assert_eq!(driver.current_url().await.unwrap(), DASHBOARD);
        // the login page is gone but what was typed is not
        assert_eq!(driver.value_of("email"), None);
        assert_eq!(driver.typed_into("email").as_deref(), Some("a@b.c"));
        assert_eq!(driver.typed_into("password").as_deref(), Some("pw"));
    }

    #[tokio::test]
    async fn test_credentials_rejected_shows_error() {
        let driver = MockDriver::new().with_page(login_page());
        driver.navigate(LOGIN).await.unwrap();

        let email = first(&driver, Selector::css("#email")).await;
        driver.fill(&email, "a@b.c").await.unwrap();
        let submit = first(&driver, Selector::css("button")).await;
        driver.click(&submit).await.unwrap();

        assert_eq!(driver.current_url().await.unwrap(), LOGIN);
        let error = first(&driver, Selector::css(".error")).await;
        assert!(error.is_visible());
        assert_eq!(driver.text(&error).await.unwrap(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_click_hidden_element_fails() {
        let driver = MockDriver::new().with_page(login_page());
        driver.navigate(LOGIN).await.unwrap();
        let error = first(&driver, Selector::css(".error")).await;
        let err = driver.click(&error).await.unwrap_err();
        assert!(err.to_string().contains("not visible"));
    }

    #[tokio::test]
    async fn test_hidden_parent_hides_children() {
        let page = MockPage::new(LOGIN)
            .with_element(MockElement::new("div", &["dialog"]).with_id("dialog"))
            .with_element(
                MockElement::new("button", &["button"])
                    .visible()
                    .with_parent("dialog"),
            );
        let driver = MockDriver::new().with_page(page);
        driver.navigate(LOGIN).await.unwrap();
        assert!(!first(&driver, Selector::css("button")).await.is_visible());
        driver.show("dialog");
        assert!(first(&driver, Selector::css("button")).await.is_visible());
    }

    #[tokio::test]
    async fn test_scoped_selector_matches_children_of_scope() {
        let page = MockPage::new(LOGIN)
            .with_element(MockElement::new("tr", &["tr"]).with_id("r1").with_text("Office").visible())
            .with_element(MockElement::new("tr", &["tr"]).with_id("r2").with_text("Lab").visible())
            .with_element(MockElement::new("button", &["button"]).with_parent("r1").visible())
            .with_element(MockElement::new("button", &["button"]).with_parent("r2").visible().with_id("lab-menu"));
        let driver = MockDriver::new().with_page(page);
        driver.navigate(LOGIN).await.unwrap();

        let found = driver
            .query_all(&Selector::has_text("tr", "lab").within("button"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        driver.remove("lab-menu");
        let found = driver
            .query_all(&Selector::has_text("tr", "lab").within("button"))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_maxlength_truncates_fill() {
        let page = MockPage::new(LOGIN).with_element(
            MockElement::new("input", &["input"])
                .with_id("name")
                .with_attribute("maxlength", "3")
                .visible(),
        );
        let driver = MockDriver::new().with_page(page);
        driver.navigate(LOGIN).await.unwrap();
        let input = first(&driver, Selector::css("input")).await;
        driver.fill(&input, "abcdef").await.unwrap();
        assert_eq!(driver.input_value(&input).await.unwrap(), "abc");
        assert_eq!(driver.value_of("name").as_deref(), Some("abc"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_delay_and_redirect() {
        let page = MockPage::new(LOGIN)
            .with_load_delay(Duration::from_millis(200))
            .redirects_after(Duration::from_millis(500), DASHBOARD);
        let driver = MockDriver::new().with_page(page);
        driver.navigate(LOGIN).await.unwrap();

        assert_eq!(
            driver.document_state().await.unwrap().ready_state,
            ReadyState::Loading
        );
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(
            driver.document_state().await.unwrap().ready_state,
            ReadyState::Complete
        );
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(driver.current_url().await.unwrap(), DASHBOARD);
    }

    #[tokio::test]
    async fn test_failing_selector() {
        let driver = MockDriver::new().with_failing_selector(Selector::css("#flaky"));
        driver.navigate(LOGIN).await.unwrap();
        assert!(driver.query_all(&Selector::css("#flaky")).await.is_err());
        assert!(driver.query_all(&Selector::css("#other")).await.is_ok());
    }

    #[tokio::test]
    async fn test_screenshot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let driver = MockDriver::new();
        driver.screenshot(&path).await.unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
        assert_eq!(driver.call_count("screenshot:"), 1);
    }
}
