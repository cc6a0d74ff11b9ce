//! Action journal.
//!
//! Every domain action moves through
//! `Idle -> Resolving -> Waiting -> Interacting -> Verifying -> Success | Failed`.
//! Multi-step actions revisit the middle phases; the journal keeps each
//! transition, collapses repeats of the same phase, and freezes a record once
//! it reaches a terminal phase. Each transition is also a `tracing` event.

use crate::result::{FailureKind, PageResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use uuid::Uuid;

/// Phase of a domain action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionPhase {
    /// Created, nothing done yet
    Idle,
    /// Resolving a locator
    Resolving,
    /// Waiting on a page-level condition
    Waiting,
    /// Clicking, filling or navigating
    Interacting,
    /// Checking the outcome
    Verifying,
    /// Completed
    Success,
    /// Ended with an error of this kind
    Failed(FailureKind),
}

impl ActionPhase {
    /// Whether no further transitions are allowed
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed(_))
    }
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Resolving => f.write_str("resolving"),
            Self::Waiting => f.write_str("waiting"),
            Self::Interacting => f.write_str("interacting"),
            Self::Verifying => f.write_str("verifying"),
            Self::Success => f.write_str("success"),
            Self::Failed(kind) => write!(f, "failed({kind})"),
        }
    }
}

/// One recorded action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Unique action ID
    pub id: String,
    /// Page object the action belongs to
    pub page: String,
    /// Action name
    pub action: String,
    /// Phases in the order they were entered
    pub phases: Vec<ActionPhase>,
    /// Start, in ms since the journal was created
    pub start_ms: u64,
    /// Duration once terminal
    pub duration_ms: Option<u64>,
    /// Error message when failed
    pub error: Option<String>,
}

impl ActionRecord {
    /// Current phase
    #[must_use]
    pub fn phase(&self) -> ActionPhase {
        self.phases.last().copied().unwrap_or(ActionPhase::Idle)
    }

    /// Check if the action completed successfully
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.phase() == ActionPhase::Success
    }
}

#[derive(Debug)]
struct JournalInner {
    created: Instant,
    records: Vec<ActionRecord>,
}

/// Shared, append-only log of actions for one session
#[derive(Debug, Clone)]
pub struct ActionJournal {
    inner: Arc<Mutex<JournalInner>>,
}

impl Default for ActionJournal {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(JournalInner {
                created: Instant::now(),
                records: Vec::new(),
            })),
        }
    }
}

impl ActionJournal {
    /// Create an empty journal
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, JournalInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start recording an action in the `Idle` phase
    #[must_use]
    pub fn begin(&self, page: &str, action: &str) -> ActionHandle {
        let started = Instant::now();
        let mut inner = self.lock();
        let start_ms = millis(started.saturating_duration_since(inner.created));
        inner.records.push(ActionRecord {
            id: Uuid::new_v4().to_string(),
            page: page.to_string(),
            action: action.to_string(),
            phases: vec![ActionPhase::Idle],
            start_ms,
            duration_ms: None,
            error: None,
        });
        tracing::debug!(page, action, "action started");
        ActionHandle {
            journal: self.clone(),
            index: inner.records.len() - 1,
            started,
        }
    }

    /// Snapshot of all records
    #[must_use]
    pub fn records(&self) -> Vec<ActionRecord> {
        self.lock().records.clone()
    }

    /// Most recent record
    #[must_use]
    pub fn last(&self) -> Option<ActionRecord> {
        self.lock().records.last().cloned()
    }

    /// Number of recorded actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Check if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Export records as pretty JSON
    pub fn to_json(&self) -> PageResult<String> {
        Ok(serde_json::to_string_pretty(&self.lock().records)?)
    }
}

/// Handle to the record of an in-flight action
#[derive(Debug)]
pub struct ActionHandle {
    journal: ActionJournal,
    index: usize,
    started: Instant,
}

impl ActionHandle {
    /// Enter a phase. Ignored once the action is terminal.
    pub fn enter(&self, phase: ActionPhase) {
        let mut inner = self.journal.lock();
        let record = &mut inner.records[self.index];
        let current = record.phase();
        if current.is_terminal() || current == phase {
            return;
        }
        record.phases.push(phase);
        tracing::trace!(page = %record.page, action = %record.action, %phase, "phase");
    }

    /// Close the record with the outcome of the action and pass it through
    pub fn finish<T>(self, result: PageResult<T>) -> PageResult<T> {
        let elapsed = millis(self.started.elapsed());
        let mut inner = self.journal.lock();
        let record = &mut inner.records[self.index];
        if !record.phase().is_terminal() {
            record.duration_ms = Some(elapsed);
            match &result {
                Ok(_) => {
                    record.phases.push(ActionPhase::Success);
                    tracing::info!(
                        page = %record.page,
                        action = %record.action,
                        duration_ms = elapsed,
                        "action succeeded"
                    );
                }
                Err(err) => {
                    record.phases.push(ActionPhase::Failed(err.kind()));
                    record.error = Some(err.to_string());
                    tracing::warn!(
                        page = %record.page,
                        action = %record.action,
                        kind = %err.kind(),
                        error = %err,
                        "action failed"
                    );
                }
            }
        }
        result
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
