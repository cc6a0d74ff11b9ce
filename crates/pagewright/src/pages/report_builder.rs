//! Report builder of the real-estate analytics dashboard.
//!
//! A report combines properties, a date range and up to [`MAX_KPIS`] KPIs of
//! one KPI group. Saved reports are listed in a side panel from which they
//! can be opened, shared through a link or deleted. Fund-level sets are
//! started from the "Create New Set" wizard.

use crate::assertion::SoftAssertions;
use crate::locator::{LocatorSpec, Selector};
use crate::page_object::{ActionScope, BoundPage, PageModel, PageObject};
use crate::result::{PageError, PageResult};
use crate::session::Session;
use crate::wait::{Condition, LoadState, WaitPolicy};
use std::time::Duration;

/// Report builder path
pub const REPORT_BUILDER_PATH: &str = "/dashboard/report-builder";

/// KPIs one report may hold
pub const MAX_KPIS: usize = 20;

/// Toast shown when "select all" would exceed [`MAX_KPIS`]
pub const KPI_LIMIT_MESSAGE: &str = "You can select a maximum of 20 KPIs";

/// Notice in the share dialog
pub const SHARE_NOTICE: &str = "Anyone who has this link can view the data you share";

/// KPI group offered on the Executive Summary tab
pub const EXECUTIVE_SUMMARY: &str = "Executive Summary";

const PATH_REGEX: &str = r"/report-builder(?:[/?#]|$)";
const SAVED_REPORTS_LIST: &str = r"div.max-h-\[250px\].overflow-y-scroll.p-2";
const TRANSIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// A report to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    /// Report title
    pub name: String,
    /// Property names picked through the search box, in order
    pub properties: Vec<String>,
    /// KPI group tab
    pub kpi_group: String,
    /// KPIs to tick, capped at [`MAX_KPIS`]
    pub kpi_count: usize,
}

impl ReportDraft {
    /// Executive Summary report with as many KPIs as allowed
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            kpi_group: EXECUTIVE_SUMMARY.to_string(),
            kpi_count: MAX_KPIS,
        }
    }

    /// Add a property
    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.properties.push(property.into());
        self
    }

    /// Use another KPI group
    #[must_use]
    pub fn with_kpi_group(mut self, group: impl Into<String>) -> Self {
        self.kpi_group = group.into();
        self
    }

    /// Tick this many KPIs
    #[must_use]
    pub const fn with_kpi_count(mut self, count: usize) -> Self {
        self.kpi_count = count;
        self
    }
}

/// DOM id prefix of a KPI group: "Executive Summary" is `executiveSummary`
fn group_id(label: &str) -> String {
    let mut words = label.split_whitespace();
    let mut id = words.next().map(str::to_lowercase).unwrap_or_default();
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            id.extend(first.to_uppercase());
            id.push_str(&chars.as_str().to_lowercase());
        }
    }
    id
}

/// The report builder
#[derive(Debug, Clone)]
pub struct ReportBuilderPage {
    page: BoundPage,
}

impl PageObject for ReportBuilderPage {
    fn page(&self) -> &BoundPage {
        &self.page
    }
}

impl ReportBuilderPage {
    /// Report builder for a session
    pub fn new(session: Session) -> PageResult<Self> {
        let model = PageModel::builder("report builder")
            .with_path(REPORT_BUILDER_PATH)
            .with_path_regex(PATH_REGEX)
            .with_selectors(
                "report name",
                r#"input[placeholder="Untitled Report"], input[placeholder="Report Name"]"#,
            )
            .with_selectors(
                "property picker",
                r#"div.relative.flex.items-center.min-h-10, input[placeholder="Select Property"]"#,
            )
            .with_selectors("property search", "input[cmdk-input]")
            .with_selectors("property options", r#"[role="option"]"#)
            .with_selectors("select all properties", r#"[role="option"]:has-text("Select All")"#)
            .with_selectors("date", r#"div:has-text("Date")"#)
            .with_selectors("kpi limit toast", &format!("text={KPI_LIMIT_MESSAGE}"))
            .with_selectors("generate", r#"button:has-text("Generate")"#)
            .with_selectors("save", r#"button:has-text("Save")"#)
            .with_selectors("report body", "div.bg-gray-25.border-none.rounded-sm.p-5, div.report-body")
            .with_selectors("filter panel", "svg.lucide.lucide-filter")
            .with_selectors("saved reports", r#"button:has-text("Saved Reports")"#)
            .with_selectors("report title", "span.text-xl.justify-self-start")
            .with_selectors("report chart", "svg.recharts-surface")
            .with_selectors("share", r#"button[aria-haspopup="dialog"]"#)
            .with_selectors("share dialog", r#"[role="dialog"]"#)
            .with_selectors("share notice", &format!("text={SHARE_NOTICE}"))
            .with_selectors(
                "share link",
                r#"[role="dialog"] input[readonly], [role="dialog"] input[type="url"]"#,
            )
            .with_selectors("copy link", r#"button:has-text("Copy Link")"#)
            .with_selectors("viewer email", r#"input[type="email"]"#)
            .with_selectors("viewer continue", r#"button:has-text("Continue")"#)
            .with_selectors("delete dialog", r#"[role="dialog"]:has-text("Delete Report")"#)
            .with_selectors("delete confirm", r#"button:has-text("Delete Report")"#)
            .with_selectors("deleted toast", "text=Report deleted successfully")
            .with_selectors("detail financial", r#"button:has-text("Detail Financial")"#)
            .with_selectors("create new set", r#"button:has-text("Create New Set")"#)
            .with_selectors("set heading", r#"h2:has-text("Create New Set")"#)
            .with_selectors("entity name", r#"input[placeholder="Enter entity name"]"#)
            .with_selectors("building select", r#"div[role="combobox"]:has-text("Select a building")"#)
            .with_selectors("building option", r#"div[role="option"]"#)
            .with_selectors("allocation percent", r#"input[placeholder="%"]"#)
            .with_selectors("add allocation", r#"button:has-text("+ Add")"#)
            .with_selectors("set next", r#"button:has-text("Next")"#)
            .build()?;
        Ok(Self {
            page: BoundPage::new(session, model),
        })
    }

    fn visible(&self) -> WaitPolicy {
        self.page.session().policy(Condition::Visible)
    }

    fn transient(&self) -> PageResult<WaitPolicy> {
        let timeout = TRANSIENT_TIMEOUT.min(self.visible().timeout());
        self.page
            .session()
            .policy_with_timeout(Condition::Visible, timeout)
    }

    fn saved_report(name: &str) -> LocatorSpec {
        LocatorSpec::single(
            format!("saved report '{name}'"),
            Selector::has_text(format!("{SAVED_REPORTS_LIST} button"), name),
        )
    }

    fn total_allocation(percent: u8) -> LocatorSpec {
        let text = format!("Total Allocation: {percent}%");
        LocatorSpec::single(format!("'{text}'"), Selector::exact_text(text))
    }

    /// Open the builder directly and let the page settle; returns the load
    /// state reached
    pub async fn navigate(&self) -> PageResult<LoadState> {
        let scope = self.page.action("navigate");
        let result = async {
            scope.navigate().await?;
            let state = scope.settle().await?;
            scope.verify_url().await?;
            scope.verify_visible("report name").await?;
            Ok(state)
        }
        .await;
        scope.finish(result)
    }

    /// Tick every property through the picker's "Select All" option;
    /// returns how many options the picker offered
    pub async fn select_all_properties(&self) -> PageResult<usize> {
        let scope = self.page.action("select_all_properties");
        let result = self.pick_all_properties(&scope).await;
        scope.finish(result)
    }

    async fn pick_all_properties(&self, scope: &ActionScope<'_>) -> PageResult<usize> {
        scope.click("property picker").await?;
        let options = scope.resolve_all(scope.spec("property options")?, &self.visible()).await?;
        scope.click("select all properties").await?;
        Ok(options.len())
    }

    /// Fill in and generate a report, then save it
    pub async fn create_report(&self, draft: &ReportDraft) -> PageResult<()> {
        let scope = self.page.action("create_report");
        let result = self.build_report(&scope, draft).await;
        scope.finish(result)
    }

    async fn build_report(&self, scope: &ActionScope<'_>, draft: &ReportDraft) -> PageResult<()> {
        let visible = self.visible();
        scope.fill("report name", &draft.name).await?;

        if !draft.properties.is_empty() {
            scope.click("property picker").await?;
            for property in &draft.properties {
                scope.fill("property search", property).await?;
                let option = LocatorSpec::new(
                    format!("property '{property}'"),
                    vec![
                        Selector::has_text(r#"[role="option"]"#, property.as_str()),
                        Selector::has_text("div", property.as_str()),
                    ],
                )?;
                let option = scope.resolve_spec(&option, &visible).await?;
                scope.click_handle(&option).await?;
            }
        }

        scope.click("date").await?;
        self.open_group(scope, &draft.kpi_group).await?;

        let boxes = LocatorSpec::single(
            format!("{} KPIs", draft.kpi_group),
            Selector::css(format!(
                r#"[data-orientation="vertical"] button[role="checkbox"]:not(#{}-select-all)"#,
                group_id(&draft.kpi_group)
            )),
        );
        let boxes = scope.resolve_all(&boxes, &visible).await?;
        let wanted = draft.kpi_count.min(MAX_KPIS);
        for checkbox in boxes.iter().take(wanted) {
            scope.click_handle(checkbox).await?;
        }

        scope.click("generate").await?;
        scope.click("save").await?;
        scope.resolve("report body").await?;
        tracing::info!(
            report = %draft.name,
            properties = draft.properties.len(),
            kpis = wanted.min(boxes.len()),
            "report created"
        );
        Ok(())
    }

    async fn open_group(&self, scope: &ActionScope<'_>, group: &str) -> PageResult<()> {
        let tab = LocatorSpec::single(format!("KPI group '{group}'"), Selector::has_text("button", group));
        let tab = scope.resolve_spec(&tab, &self.visible()).await?;
        scope.click_handle(&tab).await
    }

    /// Click a KPI group's "select all" box. Returns whether the KPI limit
    /// toast showed up.
    pub async fn select_all_kpis(&self, group: &str) -> PageResult<bool> {
        let scope = self.page.action("select_all_kpis");
        let result = async {
            self.open_group(&scope, group).await?;
            let select_all = LocatorSpec::single(
                format!("{group} select all"),
                Selector::css(format!("#{}-select-all", group_id(group))),
            );
            let select_all = scope.resolve_spec(&select_all, &self.visible()).await?;
            scope.click_handle(&select_all).await?;
            scope
                .observe_optional(scope.spec("kpi limit toast")?, TRANSIENT_TIMEOUT)
                .await
        }
        .await;
        scope.finish(result)
    }

    /// Whether a saved property filter is offered in the filter panel
    pub async fn saved_filter_listed(&self, filter: &str) -> PageResult<bool> {
        let scope = self.page.action("saved_filter_listed");
        let result = async {
            scope.click("filter panel").await?;
            let entry = LocatorSpec::single(format!("saved filter '{filter}'"), Selector::text(filter));
            scope.is_present(&entry, &self.transient()?).await
        }
        .await;
        scope.finish(result)
    }

    /// Open a saved report; returns the title it shows
    pub async fn open_saved_report(&self, name: &str) -> PageResult<String> {
        let scope = self.page.action("open_saved_report");
        let result = async {
            scope.click("saved reports").await?;
            let entry = scope.resolve_spec(&Self::saved_report(name), &self.visible()).await?;
            scope.click_handle(&entry).await?;

            let title = scope.text("report title").await?;
            scope.verify_visible("report chart").await?;
            scope.verify_visible("share").await?;
            Ok(title)
        }
        .await;
        scope.finish(result)
    }

    /// Share the open report; returns the link the dialog offers
    pub async fn share_link(&self) -> PageResult<String> {
        let scope = self.page.action("share_link");
        let result = async {
            scope.click("share").await?;
            scope.resolve("share dialog").await?;
            scope.verify_visible("share notice").await?;
            let link = scope.input_value("share link").await?;
            if link.trim().is_empty() {
                return Err(PageError::assertion("share link", "a URL", "\"\""));
            }
            scope.click("copy link").await?;
            Ok(link.trim().to_string())
        }
        .await;
        scope.finish(result)
    }

    /// Open a shared link as a viewer and check the report is shown
    pub async fn open_shared_report(&self, link: &str, viewer_email: &str, report: &str) -> PageResult<()> {
        let scope = self.page.action("open_shared_report");
        let result = async {
            scope.goto(link).await?;
            scope.fill("viewer email", viewer_email).await?;
            scope.click("viewer continue").await?;
            let title = LocatorSpec::single(format!("shared report '{report}'"), Selector::text(report));
            scope.resolve_spec(&title, &self.visible()).await?;
            Ok(())
        }
        .await;
        scope.finish(result)
    }

    /// Delete a saved report. Returns `false`, without touching anything
    /// else, when it is not listed.
    pub async fn delete_saved_report(&self, name: &str) -> PageResult<bool> {
        let scope = self.page.action("delete_saved_report");
        let result = self.delete(&scope, name).await;
        scope.finish(result)
    }

    async fn delete(&self, scope: &ActionScope<'_>, name: &str) -> PageResult<bool> {
        scope.click("saved reports").await?;
        let entry = Self::saved_report(name);
        if !scope.is_present(&entry, &self.transient()?).await? {
            tracing::info!(report = name, "no such saved report, nothing to delete");
            return Ok(false);
        }

        let trash = LocatorSpec::single(
            format!("saved report '{name}' trash"),
            Selector::has_text(format!("{SAVED_REPORTS_LIST} button"), name).within("svg.lucide-trash"),
        );
        let trash = scope.resolve_spec(&trash, &self.visible()).await?;
        scope.click_handle(&trash).await?;

        scope.resolve("delete dialog").await?;
        scope.click("delete confirm").await?;
        scope.resolve("deleted toast").await?;
        scope.wait_hidden_spec(&entry).await?;
        tracing::info!(report = name, "saved report deleted");
        Ok(true)
    }

    /// Select every property, expand Detail Financial and open the
    /// "Create New Set" wizard. Checks the empty wizard: every field shown,
    /// nothing allocated, "+ Add" and "Next" disabled. Reports every
    /// mismatch at once.
    pub async fn open_create_new_set(&self) -> PageResult<()> {
        let scope = self.page.action("open_create_new_set");
        let result = async {
            self.pick_all_properties(&scope).await?;

            // the section toggles, a second click reopens it
            scope.click("detail financial").await?;
            if !scope.is_present(scope.spec("create new set")?, &self.transient()?).await? {
                scope.click("detail financial").await?;
            }
            scope.click("create new set").await?;

            let mut soft = SoftAssertions::new();
            soft.check(scope.verify_visible("set heading").await)?;
            soft.check(scope.verify_visible("entity name").await)?;
            soft.check(scope.verify_visible("building select").await)?;
            soft.check(scope.verify_visible("allocation percent").await)?;
            soft.check(scope.verify_disabled("add allocation").await)?;
            soft.check(
                scope
                    .resolve_spec(&Self::total_allocation(0), &self.visible())
                    .await
                    .map(|_| ()),
            )?;
            soft.check(scope.verify_disabled("set next").await)?;
            soft.verify()
        }
        .await;
        scope.finish(result)
    }

    /// Allocate `percent` of the first building to a new entity, then check
    /// the running total and that the wizard may continue
    pub async fn add_allocation(&self, entity: &str, percent: u8) -> PageResult<()> {
        let scope = self.page.action("add_allocation");
        let result = async {
            if percent == 0 || percent > 100 {
                return Err(PageError::Config {
                    message: format!("allocation must be 1-100%, got {percent}%"),
                });
            }
            scope.fill("entity name", entity).await?;
            scope.click("building select").await?;
            scope.click("building option").await?;
            scope.fill("allocation percent", &percent.to_string()).await?;

            let add = scope.wait_enabled(scope.spec("add allocation")?).await?;
            scope.click_handle(&add).await?;
            scope
                .resolve_spec(&Self::total_allocation(percent), &self.visible())
                .await?;
            scope.wait_enabled(scope.spec("set next")?).await?;
            tracing::info!(entity, percent, "allocation added");
            Ok(())
        }
        .await;
        scope.finish(result)
    }
}
