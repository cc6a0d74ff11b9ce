//! Wait Mechanisms
//!
//! Condition-based waiting. A [`WaitPolicy`] says how long to wait, how often
//! to look and what to look for; [`poll_until`] is the one polling loop every
//! locator, navigation and load-state wait in the crate goes through.
//!
//! Guarantees:
//! - no wait runs past its timeout, measured from the start of the call
//! - cancelling the session's token ends the wait at the next suspension point

use crate::driver::{Driver, DocumentState, ReadyState};
use crate::result::{PageError, PageResult};
use crate::url_pattern::UrlPattern;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Network idle threshold (500ms without new requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// DOM parsed (`DOMContentLoaded` fired)
    DomContentLoaded,
    /// `load` event fired
    #[default]
    Load,
    /// Loaded and no new requests for [`NETWORK_IDLE_THRESHOLD_MS`]
    NetworkIdle,
}

impl LoadState {
    /// Name used in diagnostics
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }

    /// Whether the document's ready state satisfies this load state.
    /// Network idle additionally needs a quiet period, see [`IdleTracker`].
    #[must_use]
    pub fn reached_by(&self, ready: ReadyState) -> bool {
        match self {
            Self::DomContentLoaded => ready >= ReadyState::Interactive,
            Self::Load | Self::NetworkIdle => ready == ReadyState::Complete,
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

// =============================================================================
// CONDITION
// =============================================================================

/// What a wait is waiting for
#[derive(Debug, Clone)]
pub enum Condition {
    /// Element rendered and visible
    Visible,
    /// Element present in the DOM, visible or not
    Attached,
    /// No visible element matches
    Hidden,
    /// Current URL matches the pattern
    UrlMatches(UrlPattern),
    /// Document reached the load state
    Loaded(LoadState),
}

impl Condition {
    /// Condition for the network to settle
    #[must_use]
    pub const fn network_idle() -> Self {
        Self::Loaded(LoadState::NetworkIdle)
    }

    /// Whether the condition is about an element rather than the page
    #[must_use]
    pub const fn is_element_condition(&self) -> bool {
        matches!(self, Self::Visible | Self::Attached | Self::Hidden)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Visible => f.write_str("visible"),
            Self::Attached => f.write_str("attached"),
            Self::Hidden => f.write_str("hidden"),
            Self::UrlMatches(pattern) => write!(f, "URL matching {pattern}"),
            Self::Loaded(state) => write!(f, "load state {state}"),
        }
    }
}

// =============================================================================
// WAIT POLICY
// =============================================================================

/// How long and how to wait for a condition.
///
/// Timeout and poll interval are always non-zero; the constructors reject
/// anything else. Policies are values: the `with_*` methods return a new one.
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    timeout: Duration,
    poll_interval: Duration,
    condition: Condition,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            condition: Condition::Visible,
        }
    }
}

impl WaitPolicy {
    /// Create a policy, rejecting zero durations
    pub fn new(timeout: Duration, poll_interval: Duration, condition: Condition) -> PageResult<Self> {
        if timeout.is_zero() {
            return Err(PageError::InvalidPolicy {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        if poll_interval.is_zero() {
            return Err(PageError::InvalidPolicy {
                message: "poll interval must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            timeout,
            poll_interval,
            condition,
        })
    }

    /// Create from millisecond values
    pub fn from_millis(timeout_ms: u64, poll_interval_ms: u64, condition: Condition) -> PageResult<Self> {
        Self::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(poll_interval_ms),
            condition,
        )
    }

    /// Same timing, different condition
    #[must_use]
    pub fn with_condition(&self, condition: Condition) -> Self {
        Self {
            condition,
            ..self.clone()
        }
    }

    /// Same condition and interval, different timeout
    pub fn with_timeout(&self, timeout: Duration) -> PageResult<Self> {
        Self::new(timeout, self.poll_interval, self.condition.clone())
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Timeout in milliseconds
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Condition this policy waits for
    #[must_use]
    pub const fn condition(&self) -> &Condition {
        &self.condition
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful page-level wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
    /// URL when the condition held
    pub url: Option<String>,
}

// =============================================================================
// POLLING ENGINE
// =============================================================================

/// Poll `check` until it yields a value, the policy times out, or `cancel`
/// fires.
///
/// Each check is bounded by the time remaining, and the pause between checks
/// is clipped to it, so the call never outlives `policy.timeout()`. Check
/// errors other than [`PageError::Cancelled`] count as "not yet"; the last one
/// is reported in the timeout error.
pub async fn poll_until<T, F, Fut>(
    policy: &WaitPolicy,
    cancel: &CancellationToken,
    waited_for: &str,
    mut check: F,
) -> PageResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PageResult<Option<T>>>,
{
    let deadline = Instant::now() + policy.timeout();
    let mut last_error: Option<String> = None;
    let mut attempts = 0_u32;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        attempts += 1;
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PageError::Cancelled),
            outcome = tokio::time::timeout(remaining, check()) => outcome,
        };

        match outcome {
            Ok(Ok(Some(value))) => {
                tracing::trace!(waited_for, attempts, "condition satisfied");
                return Ok(value);
            }
            Ok(Ok(None)) => {}
            Ok(Err(PageError::Cancelled)) => return Err(PageError::Cancelled),
            Ok(Err(err)) => {
                tracing::debug!(waited_for, error = %err, "check failed, will retry");
                last_error = Some(err.to_string());
            }
            Err(_elapsed) => break,
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PageError::Cancelled),
            () = tokio::time::sleep(policy.poll_interval().min(remaining)) => {}
        }
    }

    tracing::debug!(waited_for, attempts, timeout_ms = policy.timeout_ms(), "wait timed out");
    Err(PageError::Timeout {
        condition: waited_for.to_string(),
        timeout_ms: policy.timeout_ms(),
        last_error,
    })
}

/// Tracks resource-count changes to detect a quiet network
#[derive(Debug, Default)]
pub struct IdleTracker {
    last_count: Option<usize>,
    quiet_since: Option<Instant>,
}

impl IdleTracker {
    /// Feed one observation; returns true once the page is loaded and the
    /// resource count has not changed for [`NETWORK_IDLE_THRESHOLD_MS`].
    pub fn observe(&mut self, state: DocumentState, now: Instant) -> bool {
        if self.last_count != Some(state.resource_count) {
            self.last_count = Some(state.resource_count);
            self.quiet_since = Some(now);
        }
        let quiet_for = self
            .quiet_since
            .map_or(Duration::ZERO, |since| now.saturating_duration_since(since));
        state.ready_state == ReadyState::Complete
            && quiet_for >= Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS)
    }
}

/// Wait for a page-level condition (`UrlMatches` or `Loaded`)
pub async fn wait_until(
    driver: &dyn Driver,
    policy: &WaitPolicy,
    cancel: &CancellationToken,
) -> PageResult<WaitResult> {
    let start = Instant::now();
    let waited_for = policy.condition().to_string();

    match policy.condition() {
        Condition::UrlMatches(pattern) => {
            let url = poll_until(policy, cancel, &waited_for, || async move {
                let url = driver.current_url().await?;
                Ok(pattern.matches(&url).then_some(url))
            })
            .await?;
            Ok(WaitResult {
                elapsed: start.elapsed(),
                waited_for,
                url: Some(url),
            })
        }
        Condition::Loaded(state) => {
            let state = *state;
            let tracker = Mutex::new(IdleTracker::default());
            let tracker = &tracker;
            poll_until(policy, cancel, &waited_for, || async move {
                let doc = driver.document_state().await?;
                let reached = match state {
                    LoadState::NetworkIdle => tracker
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                        .observe(doc, Instant::now()),
                    other => other.reached_by(doc.ready_state),
                };
                Ok(reached.then_some(()))
            })
            .await?;
            Ok(WaitResult {
                elapsed: start.elapsed(),
                waited_for,
                url: None,
            })
        }
        element => Err(PageError::InvalidPolicy {
            message: format!("'{element}' is an element condition; resolve it through a locator"),
        }),
    }
}
