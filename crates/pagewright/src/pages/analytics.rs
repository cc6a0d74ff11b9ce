//! Analytics dashboards of the real-estate product.
//!
//! Each dashboard is the same page with a `page` query parameter. The header
//! carries the property picker, saved property filters and a dashboard
//! switcher; an insights drawer slides up from the bottom.

use crate::assertion::{AssertionHelper, CountPredicate, SoftAssertions};
use crate::locator::{LocatorSpec, Selector};
use crate::page_object::{ActionScope, BoundPage, PageModel, PageObject};
use crate::result::PageResult;
use crate::session::Session;
use crate::wait::{Condition, LoadState, WaitPolicy};
use std::fmt;
use std::time::Duration;

/// Path shared by every dashboard
pub const ANALYTICS_PATH: &str = "/dashboard/analytics";

const PATH_REGEX: &str = r"^/dashboard/analytics(?:[/?#]|$)";
const INSIGHT_CARD: &str = "div.rounded-lg.border.bg-card.text-card-foreground.shadow-sm.my-4.mx-4.cursor-pointer";
const FILTER_ROW: &str = "div.flex.items-center.justify-between";
const TRANSIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// A dashboard reachable from the switcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dashboard {
    /// Portfolio overview
    ExecutiveSummary,
    /// Revenue and expense breakdown
    FinancialPerformance,
}

impl Dashboard {
    /// Value of the `page` query parameter
    #[must_use]
    pub const fn query_value(self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "executiveSummary",
            Self::FinancialPerformance => "financialPerformance",
        }
    }

    /// Header and switcher label
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "Executive Summary",
            Self::FinancialPerformance => "Financial Performance",
        }
    }

    /// Path with the query selecting this dashboard
    #[must_use]
    pub fn path(self) -> String {
        format!("{ANALYTICS_PATH}?page={}", self.query_value())
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// What the first insight card should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightExpectation {
    /// Badge text, e.g. "Anomalies"
    pub category: String,
    /// Recommendation sentence
    pub message: String,
    /// Date as displayed, e.g. "Mar 25, 2025"
    pub date: String,
    /// Clickable icons in the card's corner
    pub action_icons: usize,
}

/// One analytics dashboard
#[derive(Debug, Clone)]
pub struct AnalyticsPage {
    page: BoundPage,
    dashboard: Dashboard,
}

impl PageObject for AnalyticsPage {
    fn page(&self) -> &BoundPage {
        &self.page
    }
}

impl AnalyticsPage {
    /// Dashboard page for a session
    pub fn new(session: Session, dashboard: Dashboard) -> PageResult<Self> {
        let model = PageModel::builder("analytics")
            .with_path(dashboard.path())
            .with_path_regex(PATH_REGEX)
            .with_selectors(
                "property picker",
                "div.relative.flex.items-center.min-h-10.rounded-md.border.border-input, div.relative.flex.items-center.min-h-10",
            )
            .with_selectors("property list", r#"[role="listbox"]"#)
            .with_selectors("property options", r#"[role="listbox"] >> [role="option"]"#)
            .with_selectors("select all", r#"[role="option"]:has-text("Select All")"#)
            .with_selectors("filter menu", r#"div[aria-haspopup="dialog"]"#)
            .with_selectors("filter name", r#"input[placeholder="Filter name"]"#)
            .with_selectors("filter save", r#"button:has-text("Save")"#)
            .with_selectors("filter saved toast", "text=Filter saved successfully")
            .with_selectors("saved filters", "text=Saved Filters")
            .with_selectors(
                "filter delete dialog",
                r#"[role="dialog"]:has-text("Are you sure you want to delete this filter?")"#,
            )
            .with_selectors("filter delete confirm", r#"button:has-text("Delete Filter")"#)
            .with_selectors("filter deleted toast", "text=Filter deleted successfully")
            .with_selectors(
                "dashboard switcher",
                "div.p-4.flex.items-center.justify-between div.flex.items-center.gap-4 button:nth-child(1)",
            )
            .with_selectors("header", "h3.text-2xl.font-bold.text-primary-900")
            .with_selectors("summary response", "span.Typewriter__wrapper")
            .with_selectors(
                "insights toggle",
                "div.flex.flex-row.w-full.items-center.justify-center.h-12.cursor-pointer.bg-accent-400.absolute.bottom-0",
            )
            .with_selectors("insight card", INSIGHT_CARD)
            .build()?;
        Ok(Self {
            page: BoundPage::new(session, model),
            dashboard,
        })
    }

    /// Dashboard this page opens
    #[must_use]
    pub const fn dashboard(&self) -> Dashboard {
        self.dashboard
    }

    fn visible(&self) -> WaitPolicy {
        self.page.session().policy(Condition::Visible)
    }

    fn in_card(inner: &str) -> LocatorSpec {
        LocatorSpec::single(format!("insight card {inner}"), Selector::css(INSIGHT_CARD).within(inner))
    }

    fn filter_row(name: &str) -> LocatorSpec {
        LocatorSpec::single(format!("saved filter '{name}'"), Selector::has_text(FILTER_ROW, name))
    }

    /// Open the dashboard by URL and wait for it to settle
    pub async fn navigate(&self) -> PageResult<LoadState> {
        let scope = self.page.action("navigate");
        let result = async {
            scope.navigate().await?;
            let state = scope.settle().await?;
            scope.verify_url().await?;
            Ok(state)
        }
        .await;
        scope.finish(result)
    }

    /// Tick every property through "Select All"; returns how many options
    /// the list offered
    pub async fn select_all_properties(&self) -> PageResult<usize> {
        let scope = self.page.action("select_all_properties");
        let result = self.pick_all(&scope).await;
        scope.finish(result)
    }

    async fn pick_all(&self, scope: &ActionScope<'_>) -> PageResult<usize> {
        scope.click("property picker").await?;
        scope.verify_visible("property list").await?;
        let offered = scope
            .resolve_all(scope.spec("property options")?, &self.visible())
            .await?
            .len();
        scope.click("select all").await?;
        Ok(offered)
    }

    /// Select every property and save the selection as a named filter;
    /// checks it is listed under "Saved Filters"
    pub async fn save_filter(&self, name: &str) -> PageResult<()> {
        let scope = self.page.action("save_filter");
        let result = async {
            self.pick_all(&scope).await?;
            scope.click("filter menu").await?;
            scope.fill("filter name", name).await?;
            scope.click("filter save").await?;
            scope.verify_visible("filter saved toast").await?;
            scope.click("saved filters").await?;
            let saved = LocatorSpec::single(format!("saved filter '{name}'"), Selector::text(name));
            scope.resolve_spec(&saved, &self.visible()).await?;
            tracing::info!(filter = name, "filter saved");
            Ok(())
        }
        .await;
        scope.finish(result)
    }

    /// Delete a saved filter. Returns `false` when no such filter is listed.
    pub async fn delete_saved_filter(&self, name: &str) -> PageResult<bool> {
        let scope = self.page.action("delete_saved_filter");
        let result = async {
            scope.click("filter menu").await?;
            scope.click("saved filters").await?;

            let row = Self::filter_row(name);
            let transient = self
                .page
                .session()
                .policy_with_timeout(Condition::Visible, TRANSIENT_TIMEOUT.min(self.visible().timeout()))?;
            if !scope.is_present(&row, &transient).await? {
                tracing::info!(filter = name, "no such saved filter, nothing to delete");
                return Ok(false);
            }

            let trash = LocatorSpec::single(
                format!("saved filter '{name}' trash"),
                Selector::has_text(FILTER_ROW, name).within("svg.lucide-trash"),
            );
            let trash = scope.resolve_spec(&trash, &self.visible()).await?;
            scope.click_handle(&trash).await?;
            scope.verify_visible("filter delete dialog").await?;
            scope.click("filter delete confirm").await?;
            scope.verify_visible("filter deleted toast").await?;
            Ok(true)
        }
        .await;
        scope.finish(result)
    }

    /// Switch dashboards through the header menu, then check the header and
    /// that the summary assistant answered
    pub async fn switch_dashboard(&self, to: Dashboard) -> PageResult<()> {
        let scope = self.page.action("switch_dashboard");
        let result = async {
            scope.click("dashboard switcher").await?;
            let option = LocatorSpec::new(
                format!("dashboard '{to}'"),
                vec![
                    Selector::has_text(r#"[role="option"]"#, to.title()),
                    Selector::has_text(r#"[role="menuitem"]"#, to.title()),
                ],
            )?;
            let option = scope.resolve_spec(&option, &self.visible()).await?;
            scope.click_handle(&option).await?;
            scope.verify_text_contains("header", to.title()).await?;
            scope.verify_visible("summary response").await
        }
        .await;
        scope.finish(result)
    }

    /// Check the header names this page's dashboard
    pub async fn verify_header(&self) -> PageResult<()> {
        let scope = self.page.action("verify_header");
        let result = scope.verify_text_contains("header", self.dashboard.title()).await;
        scope.finish(result)
    }

    /// Open the insights drawer and check the insight card. Every mismatch
    /// is reported at once.
    pub async fn verify_insights(&self, expected: &InsightExpectation) -> PageResult<()> {
        let scope = self.page.action("verify_insights");
        let result = async {
            scope.click("insights toggle").await?;
            scope.resolve("insight card").await?;

            let mut soft = SoftAssertions::new();
            let badge = self.texts(&scope, "div.bg-cyan-100.rounded-full.w-fit").await;
            soft.check(badge.and_then(|t| AssertionHelper::assert_contains("insight category", &t, &expected.category)))?;
            let buttons = self.texts(&scope, "button").await;
            soft.check(buttons.and_then(|t| AssertionHelper::assert_contains("insight buttons", &t, "Learn More")))?;
            match self.texts(&scope, "span").await {
                Ok(spans) => {
                    soft.check(AssertionHelper::assert_contains("insight message", &spans, &expected.message))?;
                    soft.check(AssertionHelper::assert_contains("insight date", &spans, &expected.date))?;
                }
                Err(err) => soft.check(Err(err))?,
            }
            soft.check(
                scope
                    .verify_count(
                        &Self::in_card(r#"svg[class*="cursor-pointer"]"#),
                        CountPredicate::Exactly(expected.action_icons),
                    )
                    .await
                    .map(|_| ()),
            )?;
            soft.verify()
        }
        .await;
        scope.finish(result)
    }

    /// Texts of the visible elements matching `inner` inside insight cards,
    /// joined with " | "
    async fn texts(&self, scope: &ActionScope<'_>, inner: &str) -> PageResult<String> {
        let found = scope.resolve_all(&Self::in_card(inner), &self.visible()).await?;
        let mut texts = Vec::with_capacity(found.len());
        for handle in &found {
            texts.push(scope.handle_text(handle).await?);
        }
        Ok(texts.join(" | "))
    }
}
