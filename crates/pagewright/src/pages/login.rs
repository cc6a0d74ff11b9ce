//! Login page.

use crate::config::Credentials;
use crate::page_object::{ActionScope, BoundPage, PageModel, PageObject};
use crate::result::{PageError, PageResult};
use crate::session::Session;
use crate::url_pattern::UrlPattern;
use crate::wait::Condition;

/// Login form path
pub const LOGIN_PATH: &str = "/login";

/// Path a successful login lands on
pub const DASHBOARD_PATH: &str = "/dashboard";

// Matched against the URL path only; the production host itself starts
// with "dashboard".
const LOGIN_PATH_REGEX: &str = r"^/login(?:[/?#]|$)";
const DASHBOARD_PATH_REGEX: &str = r"^/dashboard(?:[/?#]|$)";

/// The dashboard's login form
#[derive(Debug, Clone)]
pub struct LoginPage {
    page: BoundPage,
    post_login: UrlPattern,
}

impl PageObject for LoginPage {
    fn page(&self) -> &BoundPage {
        &self.page
    }
}

impl LoginPage {
    /// Login page for a session
    pub fn new(session: Session) -> PageResult<Self> {
        let model = PageModel::builder("login")
            .with_path(LOGIN_PATH)
            .with_path_regex(LOGIN_PATH_REGEX)
            .with_selectors("form", "form")
            .with_selectors("email", r#"input[name="email"], input[type="email"]"#)
            .with_selectors("password", r#"input[name="password"], input[type="password"]"#)
            .with_selectors(
                "submit",
                r#"button[type="submit"], button:has-text("Log in"), button:has-text("Login")"#,
            )
            .build()?;
        Ok(Self {
            page: BoundPage::new(session, model),
            post_login: UrlPattern::path_regex(DASHBOARD_PATH_REGEX)?,
        })
    }

    /// Replace the URL pattern that signals a successful login
    #[must_use]
    pub fn with_post_login_pattern(mut self, pattern: UrlPattern) -> Self {
        self.post_login = pattern;
        self
    }

    /// Open the login form and wait for the network to settle
    pub async fn navigate(&self) -> PageResult<()> {
        let scope = self.page.action("navigate");
        let result = async {
            scope.navigate().await?;
            let idle = self.page.session().policy(Condition::network_idle());
            scope.wait_until(&idle).await?;
            scope.verify_url().await?;
            scope.verify_visible("form").await
        }
        .await;
        scope.finish(result)
    }

    /// Submit credentials on an already open form; returns the landing URL.
    ///
    /// Fails with [`PageError::Auth`] when the browser is still on the login
    /// page after the wait.
    pub async fn perform_login(&self, credentials: &Credentials) -> PageResult<String> {
        let scope = self.page.action("perform_login");
        let result = self.submit(&scope, credentials).await;
        scope.finish(result)
    }

    /// Navigate, then log in
    pub async fn login(&self, credentials: &Credentials) -> PageResult<String> {
        self.navigate().await?;
        self.perform_login(credentials).await
    }

    async fn submit(&self, scope: &ActionScope<'_>, credentials: &Credentials) -> PageResult<String> {
        let email = scope.resolve("email").await?;
        let password = scope.resolve("password").await?;
        let submit = scope.resolve("submit").await?;

        scope.fill_handle("email", &email, &credentials.email).await?;
        scope.fill_handle("password", &password, &credentials.password).await?;
        scope.click_handle(&submit).await?;

        let session = self.page.session();
        let login_page = self.page.model().url_pattern();
        match scope
            .wait_for_url(&self.post_login, &session.policy(Condition::Visible))
            .await
        {
            Ok(url) if login_page.matches(&url) => Err(PageError::Auth { url }),
            Ok(url) => {
                tracing::info!(email = %credentials.email, url = %url, "logged in");
                Ok(url)
            }
            Err(PageError::Timeout { .. }) => {
                let url = session.current_url().await?;
                if login_page.matches(&url) {
                    Err(PageError::Auth { url })
                } else {
                    Err(PageError::Navigation {
                        target: self.post_login.to_string(),
                        message: format!("landed on {url} after login"),
                    })
                }
            }
            Err(err) => Err(err),
        }
    }
}
