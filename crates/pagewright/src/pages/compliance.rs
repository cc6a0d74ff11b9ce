//! WELL compliance reports page.
//!
//! Lists compliance reports in a table and lets the user create, open and
//! delete them through modal dialogs. Reports are named after the building
//! they cover.

use crate::assertion::SoftAssertions;
use crate::locator::{LocatorSpec, Selector};
use crate::page_object::{ActionScope, BoundPage, PageModel, PageObject, TableSnapshot, TableSpec};
use crate::result::{PageError, PageResult};
use crate::session::Session;
use crate::url_pattern::UrlPattern;
use crate::wait::{Condition, WaitPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Reports list path
pub const COMPLIANCE_PATH: &str = "/me/compliance/well-compliance-v2";

/// Report table headers, in order
pub const EXPECTED_HEADERS: [&str; 2] = ["Name", "Status (Last 30 days)"];

/// Target of the "Learn more" link
pub const LEARN_MORE_URL: &str =
    "https://learn.kaiterra.com/en/resources/how-to-maximize-your-iwbi-well-v2-scorecard-with-iaq-optimizations";

const LIST_PATH_REGEX: &str = r"/well-compliance-v2(?:[/?#]|$)";
const DETAILS_PATH_REGEX: &str = r"/well-compliance-v2/[^/?#]+";
/// Introductory text under the heading
pub const DESCRIPTION: &str =
    "Stay on top of WELL compliance. Export your data in the certification-ready format.";

/// How long to look for a toast or an existing row
const TRANSIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// The compliance reports list
#[derive(Debug, Clone)]
pub struct ComplianceReportsPage {
    page: BoundPage,
    table: TableSpec,
    details: UrlPattern,
}

impl PageObject for ComplianceReportsPage {
    fn page(&self) -> &BoundPage {
        &self.page
    }
}

impl ComplianceReportsPage {
    /// Reports page for a session
    pub fn new(session: Session) -> PageResult<Self> {
        let model = PageModel::builder("compliance reports")
            .with_path(COMPLIANCE_PATH)
            .with_path_regex(LIST_PATH_REGEX)
            .with_selectors(
                "menu",
                r#"a:has-text("Compliance"), button:has-text("Compliance"), li:has-text("Compliance")"#,
            )
            .with_menu("menu")
            .with_selectors("compliance entry", r#"text="Compliance""#)
            .with_selectors("heading", r#"h1:has-text("Compliance Reports")"#)
            .with_selectors("description", &format!("text={DESCRIPTION:?}"))
            .with_selectors("create new", r#"button:has-text("Create new")"#)
            .with_selectors("learn more", r#"a:has-text("Learn more")"#)
            .with_selectors("disclaimer link", r#"a:has-text("Disclaimer")"#)
            .with_selectors("modal", ".ant-modal-content")
            .with_selectors("modal title", ".ant-modal-title")
            .with_selectors("modal body", ".ant-modal-body")
            .with_selectors("modal close", ".ant-modal-close")
            .with_selectors("create dialog", r#"div[role="dialog"]:has-text("Create Report")"#)
            .with_selectors("building filter", r#"[role="combobox"]"#)
            .with_selectors("create submit", r#"button:has-text("Create report")"#)
            .with_selectors("created toast", r#"text="Report created!""#)
            .with_selectors("row delete", r#"text="Delete""#)
            .with_selectors("delete dialog", r#"div[role="dialog"]:has-text("Delete Report")"#)
            .with_selectors("delete prompt", r#"text="Are you sure you want to delete this report?""#)
            .with_selectors("delete confirm", r#"button:has-text("Delete report")"#)
            .with_selectors("deleted toast", r#"text="Report deleted!""#)
            .with_selectors("report heading", "h1")
            .build()?;
        Ok(Self {
            page: BoundPage::new(session, model),
            table: TableSpec::html("compliance reports").with_expected_headers(EXPECTED_HEADERS),
            details: UrlPattern::path_regex(DETAILS_PATH_REGEX)?,
        })
    }

    fn row(name: &str) -> LocatorSpec {
        LocatorSpec::single(format!("report row '{name}'"), Selector::has_text("tr", name))
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

    /// Reach the page through the Compliance menu, or by URL
    pub async fn navigate(&self) -> PageResult<String> {
        self.page.navigate().await
    }

    /// Check the reports table is populated with the expected headers
    pub async fn verify_table(&self) -> PageResult<TableSnapshot> {
        self.page.verify_table(&self.table).await
    }

    /// Check the document title names the product
    pub async fn verify_title(&self) -> PageResult<()> {
        self.page.verify_title_contains("Kaiterra").await
    }

    /// Check the current URL is the reports list
    pub async fn verify_url(&self) -> PageResult<()> {
        self.page.verify_url().await
    }

    /// Check the exact "Compliance" label is shown
    pub async fn verify_compliance_entry(&self) -> PageResult<()> {
        self.page.verify_visible("compliance entry").await
    }

    /// Check heading, description, buttons and links. Reports every
    /// mismatch at once.
    pub async fn verify_overview(&self) -> PageResult<()> {
        let scope = self.page.action("verify_overview");
        let result = async {
            let mut soft = SoftAssertions::new();
            soft.check(scope.verify_visible("heading").await)?;
            soft.check(scope.verify_visible("description").await)?;
            soft.check(scope.verify_visible("create new").await)?;
            soft.check(scope.verify_attribute("learn more", "href", LEARN_MORE_URL).await)?;
            soft.check(scope.verify_attribute("disclaimer link", "href", "#").await)?;
            soft.verify()
        }
        .await;
        scope.finish(result)
    }

    /// Open the disclaimer modal; returns its body text
    pub async fn open_disclaimer(&self) -> PageResult<String> {
        let scope = self.page.action("open_disclaimer");
        let result = async {
            scope.click("disclaimer link").await?;
            scope.resolve("modal").await?;
            scope.verify_text("modal title", "Disclaimer").await?;
            let body = scope.text("modal body").await?;
            if body.is_empty() {
                return Err(PageError::assertion("modal body", "non-empty text", "\"\""));
            }
            Ok(body)
        }
        .await;
        scope.finish(result)
    }

    /// Close the disclaimer modal and wait for it to disappear
    pub async fn close_disclaimer(&self) -> PageResult<()> {
        let scope = self.page.action("close_disclaimer");
        let result = async {
            scope.click("modal close").await?;
            scope.wait_hidden("modal").await
        }
        .await;
        scope.finish(result)
    }

    /// Whether a report row is shown, allowing a short time for the table
    pub async fn report_exists(&self, name: &str) -> PageResult<bool> {
        let scope = self.page.action("report_exists");
        let result = self.row_present(&scope, name).await;
        scope.finish(result)
    }

    async fn row_present(&self, scope: &ActionScope<'_>, name: &str) -> PageResult<bool> {
        scope.is_present(&Self::row(name), &self.transient()?).await
    }

    /// Create a report for `building` and wait for its row
    pub async fn create_report(&self, building: &str) -> PageResult<()> {
        let scope = self.page.action("create_report");
        let result = self.create(&scope, building).await;
        scope.finish(result)
    }

    async fn create(&self, scope: &ActionScope<'_>, building: &str) -> PageResult<()> {
        let visible = self.visible();
        scope.click("create new").await?;
        scope.resolve("create dialog").await?;

        scope.fill("building filter", building).await?;
        let option = LocatorSpec::single(format!("building option '{building}'"), Selector::text(building));
        let option = scope.resolve_spec(&option, &visible).await?;
        scope.click_handle(&option).await?;

        let submit = scope.wait_enabled(scope.spec("create submit")?).await?;
        scope.click_handle(&submit).await?;

        scope
            .observe_optional(scope.spec("created toast")?, TRANSIENT_TIMEOUT)
            .await?;
        scope.wait_hidden("create dialog").await?;
        scope.resolve_spec(&Self::row(building), &visible).await?;
        tracing::info!(building, "report created");
        Ok(())
    }

    /// Delete a report. Returns `false`, without touching the page, when no
    /// such row is shown.
    pub async fn delete_report(&self, name: &str) -> PageResult<bool> {
        let scope = self.page.action("delete_report");
        let result = self.delete(&scope, name).await;
        scope.finish(result)
    }

    async fn delete(&self, scope: &ActionScope<'_>, name: &str) -> PageResult<bool> {
        if !self.row_present(scope, name).await? {
            tracing::info!(report = name, "no such report, nothing to delete");
            return Ok(false);
        }
        let visible = self.visible();

        // the row's last button opens its action menu
        let buttons = LocatorSpec::single(
            format!("report row '{name}' buttons"),
            Selector::has_text("tr", name).within("button"),
        );
        let menu = scope
            .resolve_all(&buttons, &visible)
            .await?
            .pop()
            .ok_or_else(|| PageError::driver(format!("no buttons in report row '{name}'")))?;
        scope.click_handle(&menu).await?;
        scope.click("row delete").await?;

        scope.resolve("delete dialog").await?;
        scope.resolve("delete prompt").await?;
        scope.click("delete confirm").await?;
        scope.wait_hidden("delete dialog").await?;

        scope
            .observe_optional(scope.spec("deleted toast")?, TRANSIENT_TIMEOUT)
            .await?;
        scope.wait_hidden_spec(&Self::row(name)).await?;
        tracing::info!(report = name, "report deleted");
        Ok(true)
    }

    /// Open a report's details; returns the details URL
    pub async fn open_report(&self, name: &str) -> PageResult<String> {
        let scope = self.page.action("open_report");
        let result = async {
            let link = LocatorSpec::single(format!("report link '{name}'"), Selector::has_text("a", name));
            let link = scope.resolve_spec(&link, &self.visible()).await?;
            scope.click_handle(&link).await?;
            let url = scope.wait_for_url(&self.details, &self.visible()).await?;
            scope.verify_text("report heading", name).await?;
            Ok(url)
        }
        .await;
        scope.finish(result)
    }

    /// Screenshot of the page
    pub async fn screenshot(&self, file: impl AsRef<Path>) -> PageResult<PathBuf> {
        self.page.screenshot(file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::driver::Driver;
    use crate::mock::{MockDriver, MockEffect, MockElement, MockPage};
    use std::sync::Arc;
    use tokio::time::Instant;

    const BASE: &str = "https://dash.test";

    fn list_url() -> String {
        format!("{BASE}{COMPLIANCE_PATH}")
    }

    fn table(page: MockPage, rows: &[(&str, &str)]) -> MockPage {
        let mut page = page
            .with_element(MockElement::new("table", &["table"]).visible())
            .with_element(MockElement::new("th", &["thead th"]).with_text("Name").visible())
            .with_element(
                MockElement::new("th", &["thead th"])
                    .with_text("Status (Last 30 days)")
                    .visible(),
            );
        for (id, text) in rows {
            page = page
                .with_element(
                    MockElement::new("tr", &["tr", "tbody tr"])
                        .with_id(*id)
                        .with_text(*text)
                        .visible(),
                )
                .with_element(MockElement::new("button", &["button"]).with_parent(*id).with_text("Export"))
                .with_element(
                    MockElement::new("button", &["button"])
                        .with_parent(*id)
                        .visible()
                        .on_click(MockEffect::Show("row-menu".to_string())),
                );
        }
        page
    }

    async fn open(driver: &Arc<MockDriver>) -> ComplianceReportsPage {
        driver.navigate(&list_url()).await.unwrap();
        let session = Session::new(
            Arc::clone(driver) as Arc<dyn Driver>,
            SessionConfig::new()
                .with_base_url(BASE)
                .with_timeout_ms(3000)
                .with_poll_interval_ms(100),
        )
        .unwrap();
        ComplianceReportsPage::new(session).unwrap()
    }

    mod listing_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_verify_table() {
            let driver = Arc::new(MockDriver::new().with_page(table(
                MockPage::new(list_url()).with_title("WELL Compliance | Kaiterra"),
                &[("row-office", "Office Active"), ("row-lab", "Lab Inactive")],
            )));
            let page = open(&driver).await;
            let snapshot = page.verify_table().await.unwrap();
            assert_eq!(snapshot.row_count(), 2);
            page.verify_title().await.unwrap();
            page.verify_url().await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_empty_table_not_populated() {
            let driver = Arc::new(MockDriver::new().with_page(table(MockPage::new(list_url()), &[])));
            let page = open(&driver).await;
            let err = page.verify_table().await.unwrap_err();
            assert_eq!(err.kind(), crate::FailureKind::TableNotPopulated);
        }

        #[tokio::test(start_paused = true)]
        async fn test_compliance_entry_needs_exact_label() {
            let driver = Arc::new(MockDriver::new().with_page(
                MockPage::new(list_url())
                    .with_element(
                        MockElement::new("h1", &["h1"])
                            .with_text("Compliance Reports")
                            .visible(),
                    )
                    .with_element(
                        MockElement::new("span", &["span"])
                            .with_id("nav-label")
                            .with_text("Compliance"),
                    ),
            ));
            let page = open(&driver).await;
            // the heading merely contains the word and the label is hidden
            let err = page.verify_compliance_entry().await.unwrap_err();
            assert!(matches!(err, PageError::Timeout { .. } | PageError::NotFound { .. }));

            driver.show("nav-label");
            page.verify_compliance_entry().await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_details_url_is_not_the_list() {
            let driver = Arc::new(MockDriver::new());
            let page = open(&driver).await;
            let list = page.page().model().url_pattern();
            assert!(list.matches(&list_url()));
            assert!(list.matches(&format!("{list}?tab=all", list = list_url())));
            assert!(!list.matches(&format!("{BASE}/me/compliance/well-compliance-v2-beta")));
            assert!(page.details.matches(&format!("{}/42", list_url())));
            assert!(!page.details.matches(&list_url()));
        }

        #[tokio::test(start_paused = true)]
        async fn test_overview_collects_every_mismatch() {
            let driver = Arc::new(MockDriver::new().with_page(
                MockPage::new(list_url())
                    .with_element(MockElement::new("h1", &["h1"]).with_text("Compliance Reports").visible())
                    .with_element(MockElement::new("p", &["p"]).with_text(DESCRIPTION).visible())
                    .with_element(MockElement::new("button", &["button"]).with_text("Create new").visible())
                    .with_element(
                        MockElement::new("a", &["a"])
                            .with_text("Learn more")
                            .with_attribute("href", "https://example.com/old")
                            .visible(),
                    )
                    .with_element(
                        MockElement::new("a", &["a"])
                            .with_text("Disclaimer")
                            .with_attribute("href", "/disclaimer")
                            .visible(),
                    ),
            ));
            let page = open(&driver).await;
            let err = page.verify_overview().await.unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains("2 of 5 checks"));
            assert!(msg.contains("learn more @href"));
            assert!(msg.contains("disclaimer link @href"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_disclaimer_modal() {
            let driver = Arc::new(MockDriver::new().with_page(
                MockPage::new(list_url())
                    .with_element(
                        MockElement::new("a", &["a"])
                            .with_text("Disclaimer")
                            .visible()
                            .on_click(MockEffect::Show("modal".to_string())),
                    )
                    .with_element(MockElement::new("div", &[".ant-modal-content"]).with_id("modal"))
                    .with_element(
                        MockElement::new("div", &[".ant-modal-title"])
                            .with_parent("modal")
                            .with_text("Disclaimer")
                            .visible(),
                    )
                    .with_element(
                        MockElement::new("div", &[".ant-modal-body"])
                            .with_parent("modal")
                            .with_text("Reports are provided for information only.")
                            .visible(),
                    )
                    .with_element(
                        MockElement::new("button", &[".ant-modal-close"])
                            .with_parent("modal")
                            .visible()
                            .on_click(MockEffect::Hide("modal".to_string())),
                    ),
            ));
            let page = open(&driver).await;
            let body = page.open_disclaimer().await.unwrap();
            assert!(body.starts_with("Reports are provided"));
            page.close_disclaimer().await.unwrap();
        }
    }

    mod mutation_tests {
        use super::*;

        fn create_driver() -> Arc<MockDriver> {
            let page = table(MockPage::new(list_url()), &[("row-lab", "Lab Inactive")])
                .with_element(
                    MockElement::new("button", &["button"])
                        .with_text("Create new")
                        .visible()
                        .on_click(MockEffect::Show("create-dialog".to_string())),
                )
                .with_element(
                    MockElement::new("div", &[r#"div[role="dialog"]"#])
                        .with_id("create-dialog")
                        .with_text("Create Report"),
                )
                .with_element(
                    MockElement::new("input", &[r#"[role="combobox"]"#])
                        .with_parent("create-dialog")
                        .visible()
                        .on_fill(MockEffect::Show("option".to_string())),
                )
                .with_element(
                    MockElement::new("li", &["li"])
                        .with_id("option")
                        .with_text("Office")
                        .on_click(MockEffect::SetAttribute {
                            id: "create-submit".to_string(),
                            name: "disabled".to_string(),
                            value: None,
                        }),
                )
                .with_element(
                    MockElement::new("button", &["button"])
                        .with_id("create-submit")
                        .with_parent("create-dialog")
                        .with_text("Create report")
                        .with_attribute("disabled", "")
                        .visible()
                        .on_click(MockEffect::Hide("create-dialog".to_string()))
                        .on_click(MockEffect::Hide("option".to_string()))
                        .on_click(MockEffect::Show("row-office".to_string())),
                )
                .with_element(
                    MockElement::new("tr", &["tr", "tbody tr"])
                        .with_id("row-office")
                        .with_text("Office Pending"),
                );
            Arc::new(MockDriver::new().with_page(page))
        }

        #[tokio::test(start_paused = true)]
        async fn test_create_report_without_toast() {
            let driver = create_driver();
            let page = open(&driver).await;
            assert!(!page.report_exists("Office").await.unwrap());

            page.create_report("Office").await.unwrap();
            assert!(page.report_exists("Office").await.unwrap());
            let record = page.page().session().journal().last().unwrap();
            assert!(record.succeeded());
        }

        fn delete_driver() -> Arc<MockDriver> {
            let page = table(MockPage::new(list_url()), &[("row-lab", "Lab Inactive")])
                .with_element(
                    MockElement::new("li", &["li"])
                        .with_id("row-menu")
                        .with_text("Delete")
                        .on_click(MockEffect::Show("delete-dialog".to_string())),
                )
                .with_element(
                    MockElement::new("div", &[r#"div[role="dialog"]"#])
                        .with_id("delete-dialog")
                        .with_text("Delete Report"),
                )
                .with_element(
                    MockElement::new("p", &["p"])
                        .with_parent("delete-dialog")
                        .with_text("Are you sure you want to delete this report?")
                        .visible(),
                )
                .with_element(
                    MockElement::new("button", &["button"])
                        .with_parent("delete-dialog")
                        .with_text("Delete report")
                        .visible()
                        .on_click(MockEffect::Hide("delete-dialog".to_string()))
                        .on_click(MockEffect::Hide("row-menu".to_string()))
                        .on_click(MockEffect::Show("deleted-toast".to_string()))
                        .on_click(MockEffect::Remove("row-lab".to_string())),
                )
                .with_element(
                    MockElement::new("div", &["div"])
                        .with_id("deleted-toast")
                        .with_text("Report deleted!"),
                );
            Arc::new(MockDriver::new().with_page(page))
        }

        #[tokio::test(start_paused = true)]
        async fn test_delete_existing_report() {
            let driver = delete_driver();
            let page = open(&driver).await;
            assert!(page.delete_report("Lab").await.unwrap());
            assert!(!page.report_exists("Lab").await.unwrap());
            // the last of the row's buttons opened the menu
            assert!(driver.was_called("click:tr:has-text(\"Lab\") >> button[1]"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_delete_absent_report_touches_nothing() {
            let driver = delete_driver();
            let page = open(&driver).await;
            let start = Instant::now();
            assert!(!page.delete_report("Warehouse").await.unwrap());
            assert!(!driver.was_called("click:"));
            assert!(start.elapsed() <= TRANSIENT_TIMEOUT);
        }
    }

    mod details_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_open_report() {
            let details = format!("{BASE}{COMPLIANCE_PATH}/42");
            let driver = Arc::new(
                MockDriver::new()
                    .with_page(
                        MockPage::new(list_url()).with_element(
                            MockElement::new("a", &["a"])
                                .with_text("Office")
                                .visible()
                                .on_click(MockEffect::Navigate(details.clone())),
                        ),
                    )
                    .with_page(
                        MockPage::new(details.clone())
                            .with_element(MockElement::new("h1", &["h1"]).with_text(" Office ").visible()),
                    ),
            );
            let page = open(&driver).await;
            assert_eq!(page.open_report("Office").await.unwrap(), details);
        }

        #[tokio::test(start_paused = true)]
        async fn test_open_report_wrong_heading() {
            let details = format!("{BASE}{COMPLIANCE_PATH}/7");
            let driver = Arc::new(
                MockDriver::new()
                    .with_page(
                        MockPage::new(list_url()).with_element(
                            MockElement::new("a", &["a"])
                                .with_text("Lab")
                                .visible()
                                .on_click(MockEffect::Navigate(details.clone())),
                        ),
                    )
                    .with_page(
                        MockPage::new(details)
                            .with_element(MockElement::new("h1", &["h1"]).with_text("Office").visible()),
                    ),
            );
            let page = open(&driver).await;
            let err = page.open_report("Lab").await.unwrap_err();
            assert!(matches!(err, PageError::Assertion { ref subject, .. } if subject == "report heading"));
        }
    }
}
