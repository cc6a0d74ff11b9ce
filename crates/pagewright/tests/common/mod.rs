//! Scripted dashboard shared by the integration tests.

#![allow(dead_code)]

use pagewright::pages::compliance::COMPLIANCE_PATH;
use pagewright::{
    Driver, MockDriver, MockEffect, MockElement, MockPage, Session, SessionConfig,
};
use std::sync::Arc;
use std::time::Duration;

pub const BASE: &str = "https://dashboard.test";
pub const EMAIL: &str = "qa@example.com";
pub const PASSWORD: &str = "correct horse";

pub fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

pub fn config() -> SessionConfig {
    SessionConfig::new()
        .with_base_url(BASE)
        .with_timeout_ms(2_000)
        .with_poll_interval_ms(100)
}

pub fn session(driver: &Arc<MockDriver>) -> Session {
    Session::new(Arc::clone(driver) as Arc<dyn Driver>, config()).unwrap()
}

/// Login form that answers only to the fallback selectors
pub fn login_page() -> MockPage {
    MockPage::new(url("/login"))
        .with_title("Log in | Kaiterra")
        .with_network_activity(Duration::from_millis(400))
        .with_element(MockElement::new("form", &["form"]).visible())
        .with_element(
            MockElement::new("input", &[r#"input[type="email"]"#])
                .with_id("email")
                .visible(),
        )
        .with_element(
            MockElement::new("input", &[r#"input[type="password"]"#])
                .with_id("password")
                .visible()
                .appears_after(Duration::from_millis(300)),
        )
        .with_element(
            MockElement::new("div", &[".error"])
                .with_id("error")
                .with_text("Invalid email or password"),
        )
        .with_element(
            MockElement::new("button", &["button"])
                .with_text("Login")
                .visible()
                .on_click(MockEffect::SubmitCredentials {
                    email_field: "email".to_string(),
                    password_field: "password".to_string(),
                    email: EMAIL.to_string(),
                    password: PASSWORD.to_string(),
                    success_url: url("/dashboard"),
                    error_id: Some("error".to_string()),
                }),
        )
}

/// Dashboard with a Compliance menu entry
pub fn dashboard() -> MockPage {
    MockPage::new(url("/dashboard"))
        .with_title("Dashboard | Kaiterra")
        .with_element(
            MockElement::new("li", &["li"])
                .with_text("Compliance")
                .visible()
                .on_click(MockEffect::Navigate(url(COMPLIANCE_PATH))),
        )
}

/// Reports list with the given report rows
pub fn reports(rows: &[&str]) -> MockPage {
    let mut page = MockPage::new(url(COMPLIANCE_PATH))
        .with_title("WELL Compliance | Kaiterra")
        .with_element(MockElement::new("table", &["table"]).visible())
        .with_element(MockElement::new("th", &["thead th"]).with_text("Name").visible())
        .with_element(
            MockElement::new("th", &["thead th"])
                .with_text("Status (Last 30 days)")
                .visible(),
        );
    for (i, row) in rows.iter().enumerate() {
        page = page.with_element(
            MockElement::new("tr", &["tr", "tbody tr"])
                .with_id(format!("row-{i}"))
                .with_text(format!("{row} Active"))
                .visible()
                .appears_after(Duration::from_millis(600)),
        );
    }
    page
}

pub fn dashboard_driver(rows: &[&str]) -> Arc<MockDriver> {
    Arc::new(
        MockDriver::new()
            .with_page(login_page())
            .with_page(dashboard())
            .with_page(reports(rows)),
    )
}
