//! Ordered fallback strategies.
//!
//! [`attempt_in_order`] is the one place where a failure may be turned into
//! "try the next way". Strategies run lazily and sequentially; the first
//! success wins. Cancellation is never treated as a strategy failure.

use crate::result::PageError;
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;

/// One way of performing a step
pub struct Strategy<'a, T> {
    name: String,
    run: Box<dyn FnOnce() -> BoxFuture<'a, Result<T, PageError>> + Send + 'a>,
}

impl<'a, T> Strategy<'a, T> {
    /// Create a named strategy; `run` is not called until it is attempted
    pub fn new<F, Fut>(name: impl Into<String>, run: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, PageError>> + Send + 'a,
    {
        Self {
            name: name.into(),
            run: Box::new(move || run().boxed()),
        }
    }

    /// Strategy name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> fmt::Debug for Strategy<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// Winning strategy and its value
#[derive(Debug)]
pub struct Attempt<T> {
    /// Name of the strategy that succeeded
    pub strategy: String,
    /// Position of that strategy in the list
    pub index: usize,
    /// Its value
    pub value: T,
}

/// A strategy that did not succeed
#[derive(Debug)]
pub struct StrategyFailure {
    /// Strategy name
    pub strategy: String,
    /// Why it failed
    pub error: PageError,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}

/// Why no strategy produced a value
#[derive(Debug)]
pub enum FallbackError {
    /// A strategy observed cancellation; later strategies were not run
    Cancelled,
    /// Every strategy failed, in order
    Exhausted(Vec<StrategyFailure>),
}

impl FallbackError {
    /// Convert into a [`PageError`], building the exhaustion error from the
    /// joined failure descriptions
    pub fn into_page_error(self, exhausted: impl FnOnce(String) -> PageError) -> PageError {
        match self {
            Self::Cancelled => PageError::Cancelled,
            Self::Exhausted(failures) => exhausted(
                failures
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        }
    }
}

/// Run strategies in order until one succeeds.
pub async fn attempt_in_order<T>(strategies: Vec<Strategy<'_, T>>) -> Result<Attempt<T>, FallbackError> {
    let total = strategies.len();
    let mut failures = Vec::with_capacity(total);

    for (index, strategy) in strategies.into_iter().enumerate() {
        let Strategy { name, run } = strategy;
        tracing::debug!(strategy = %name, index, total, "attempting strategy");
        match run().await {
            Ok(value) => {
                if index > 0 {
                    tracing::info!(strategy = %name, failed = index, "fallback strategy succeeded");
                }
                return Ok(Attempt {
                    strategy: name,
                    index,
                    value,
                });
            }
            Err(PageError::Cancelled) => return Err(FallbackError::Cancelled),
            Err(error) => {
                tracing::warn!(strategy = %name, error = %error, "strategy failed");
                failures.push(StrategyFailure {
                    strategy: name,
                    error,
                });
            }
        }
    }

    Err(FallbackError::Exhausted(failures))
}
