//! Per-test session.
//!
//! A [`Session`] owns everything one test needs to drive a page: the driver
//! handle, validated configuration, the cancellation token and the action
//! journal. Cloning is cheap and clones share all of it, so several page
//! objects can be built from one session.

use crate::action::ActionJournal;
use crate::config::SessionConfig;
use crate::driver::Driver;
use crate::locator::ElementLocator;
use crate::result::{PageError, PageResult};
use crate::wait::{self, Condition, WaitPolicy, WaitResult};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Driver, configuration, cancellation and journal for one test
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    driver: Arc<dyn Driver>,
    config: Arc<SessionConfig>,
    policy: WaitPolicy,
    cancel: CancellationToken,
    journal: ActionJournal,
}

impl Session {
    /// Create a session, validating the configuration
    pub fn new(driver: Arc<dyn Driver>, config: SessionConfig) -> PageResult<Self> {
        let config = config.validated()?;
        let policy = config.default_policy(Condition::Visible)?;
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, base_url = %config.base_url, timeout_ms = config.timeout_ms, "session created");
        Ok(Self {
            id,
            driver,
            config: Arc::new(config),
            policy,
            cancel: CancellationToken::new(),
            journal: ActionJournal::new(),
        })
    }

    /// Session ID
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Driver handle
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Action journal shared by every page object of this session
    #[must_use]
    pub const fn journal(&self) -> &ActionJournal {
        &self.journal
    }

    /// Token that cancels every wait and driver call of this session
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel all in-flight and future actions
    pub fn cancel(&self) {
        tracing::info!(session = %self.id, "session cancelled");
        self.cancel.cancel();
    }

    /// Check if the session was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Locator bound to this session's driver and token
    #[must_use]
    pub fn locator(&self) -> ElementLocator<'_> {
        ElementLocator::new(self.driver.as_ref(), &self.cancel)
    }

    /// Configured timing with the given condition
    #[must_use]
    pub fn policy(&self, condition: Condition) -> WaitPolicy {
        self.policy.with_condition(condition)
    }

    /// Configured poll interval, the given timeout and condition
    pub fn policy_with_timeout(&self, condition: Condition, timeout: Duration) -> PageResult<WaitPolicy> {
        self.policy.with_condition(condition).with_timeout(timeout)
    }

    /// Absolute URL for a path on the configured base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    /// Resolve a screenshot path against the configured directory
    #[must_use]
    pub fn screenshot_path(&self, file: impl AsRef<Path>) -> PathBuf {
        let file = file.as_ref();
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.config.screenshot_dir.join(file)
        }
    }

    /// Run a driver call unless the session is cancelled first
    pub async fn guarded<T, F>(&self, call: F) -> PageResult<T>
    where
        F: Future<Output = PageResult<T>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(PageError::Cancelled),
            result = call => result,
        }
    }

    /// Navigate the driver
    pub async fn goto(&self, url: &str) -> PageResult<()> {
        tracing::debug!(session = %self.id, url, "navigate");
        self.guarded(self.driver.navigate(url)).await
    }

    /// Wait for a page-level condition
    pub async fn wait_until(&self, policy: &WaitPolicy) -> PageResult<WaitResult> {
        wait::wait_until(self.driver.as_ref(), policy, &self.cancel).await
    }

    /// Current URL
    pub async fn current_url(&self) -> PageResult<String> {
        self.guarded(self.driver.current_url()).await
    }
}
