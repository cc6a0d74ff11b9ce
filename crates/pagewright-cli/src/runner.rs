//! The checks each subcommand runs, over any [`Session`].

use crate::commands::{Cli, ComplianceArgs};
use crate::error::{CliResult, StepExt};
use crate::output::Reporter;
use pagewright::{BrowserConfig, ComplianceReportsPage, LoginPage, PageResult, Session, SessionConfig};

/// Session settings from the environment, with command-line overrides
pub fn session_config<F>(base_url: Option<&str>, timeout_ms: Option<u64>, lookup: F) -> CliResult<SessionConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = SessionConfig::from_lookup(lookup)?;
    if let Some(url) = base_url {
        config = config.with_base_url(url);
    }
    if let Some(ms) = timeout_ms {
        config = config.with_timeout_ms(ms);
    }
    Ok(config.validated()?)
}

/// Browser launch settings from the command line
#[must_use]
pub fn browser_config(cli: &Cli) -> BrowserConfig {
    let mut config = BrowserConfig::default().with_headless(!cli.headed);
    if cli.no_sandbox {
        config = config.with_no_sandbox();
    }
    if let Some(ref path) = cli.chromium {
        config = config.with_chromium_path(path.display().to_string());
    }
    config
}

/// Pretty JSON of the resolved configuration. The password is never
/// serialized.
pub fn render_config(config: &SessionConfig) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

fn checked<T>(reporter: &Reporter, step: &str, result: PageResult<T>) -> CliResult<T> {
    if let Err(ref e) = result {
        reporter.failure(&format!("{step} [{}]", e.kind()));
    }
    result.step(step)
}

/// Log in with the session's credentials; returns the landing URL
pub async fn run_login(session: &Session, reporter: &Reporter) -> CliResult<String> {
    let credentials = session.config().credentials.clone();
    let login = checked(reporter, "login page", LoginPage::new(session.clone()))?;

    checked(reporter, "open login", login.navigate().await)?;
    reporter.success("login form visible");

    let url = checked(reporter, "login", login.perform_login(&credentials).await)?;
    reporter.success(&format!("logged in as {} ({url})", credentials.email));
    Ok(url)
}

/// Log in, then check the compliance reports page
pub async fn run_compliance(session: &Session, args: &ComplianceArgs, reporter: &Reporter) -> CliResult<()> {
    run_login(session, reporter).await?;

    reporter.header("Compliance reports");
    let reports = checked(reporter, "reports page", ComplianceReportsPage::new(session.clone()))?;

    let url = checked(reporter, "navigate", reports.navigate().await)?;
    reporter.success(&format!("reached {url}"));

    let table = checked(reporter, "report table", reports.verify_table().await)?;
    reporter.success(&format!(
        "table populated: {} headers, {} rows",
        table.headers.len(),
        table.row_count()
    ));

    checked(reporter, "page title", reports.verify_title().await)?;
    checked(reporter, "overview", reports.verify_overview().await)?;
    reporter.success("heading, description and links present");

    if args.disclaimer {
        let body = checked(reporter, "disclaimer", reports.open_disclaimer().await)?;
        reporter.info(&format!("disclaimer: {} characters", body.chars().count()));
        checked(reporter, "close disclaimer", reports.close_disclaimer().await)?;
        reporter.success("disclaimer opens and closes");
    }

    if let Some(ref file) = args.screenshot {
        let path = checked(reporter, "screenshot", reports.screenshot(file).await)?;
        reporter.success(&format!("screenshot saved to {}", path.display()));
    }

    tracing::info!(
        session = %session.id(),
        actions = session.journal().len(),
        "compliance checks passed"
    );
    Ok(())
}
