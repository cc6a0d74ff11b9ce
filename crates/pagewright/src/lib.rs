//! Pagewright: resilient page objects for browser end-to-end tests.
//!
//! Test code talks to pages through named elements instead of raw selectors.
//! Each element carries ordered selector alternatives; resolution polls the
//! alternatives under a bounded [`WaitPolicy`] and fails with a typed
//! [`PageError`] that names the element, what was tried and for how long.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Page object  │──►│ Element      │──►│ Wait engine  │──►│ Driver       │
//! │ (pages::*)   │   │ locator      │   │ poll_until   │   │ CDP / mock   │
//! └──────┬───────┘   └──────────────┘   └──────────────┘   └──────────────┘
//!        │ verdicts
//!        ▼
//! ┌──────────────┐   ┌──────────────┐
//! │ Assertion    │   │ Action       │
//! │ helper       │   │ journal      │
//! └──────────────┘   └──────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let session = Session::new(driver, SessionConfig::from_env()?)?;
//! let login = LoginPage::new(session.clone())?;
//! login.login(&session.config().credentials).await?;
//!
//! let reports = ComplianceReportsPage::new(session)?;
//! reports.navigate().await?;
//! reports.verify_table().await?;
//! ```

#![warn(missing_docs)]

pub mod action;
pub mod assertion;
pub mod browser;
pub mod config;
pub mod driver;
pub mod fallback;
pub mod locator;
pub mod mock;
pub mod page_object;
pub mod pages;
mod result;
pub mod session;
pub mod url_pattern;
pub mod wait;

pub use action::{ActionJournal, ActionPhase, ActionRecord};
pub use assertion::{AssertionHelper, AssertionSummary, CountPredicate, SoftAssertions};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{Credentials, SessionConfig};
pub use driver::{DocumentState, Driver, ElementHandle, ReadyState};
pub use fallback::{attempt_in_order, Attempt, FallbackError, Strategy};
pub use locator::{ElementLocator, LocatorSpec, Selector};
pub use mock::{MockDriver, MockEffect, MockElement, MockPage};
pub use page_object::{
    ActionScope, BoundPage, PageModel, PageModelBuilder, PageObject, TableSnapshot, TableSpec,
};
pub use pages::{
    AnalyticsPage, ComplianceReportsPage, Dashboard, InsightExpectation, LandlordSignup, LoginPage,
    ReportBuilderPage, ReportDraft, SignupOutcome, SignupPage,
};
pub use result::{ActionResult, FailureKind, PageError, PageResult};
pub use session::Session;
pub use url_pattern::UrlPattern;
pub use wait::{poll_until, Condition, LoadState, WaitPolicy, WaitResult};
