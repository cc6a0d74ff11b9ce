//! Landlord signup form of the analytics product.

use crate::action::ActionPhase;
use crate::locator::{LocatorSpec, Selector};
use crate::page_object::{ActionScope, BoundPage, PageModel, PageObject};
use crate::result::PageResult;
use crate::session::Session;
use crate::url_pattern::UrlPattern;
use crate::wait::{poll_until, Condition, LoadState};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Signup form path
pub const SIGNUP_PATH: &str = "/signup";

/// Shown when the email is taken
pub const ALREADY_EXISTS_MESSAGE: &str = "User with that email already exists";

/// Views granted to a new landlord unless told otherwise
pub const DEFAULT_VIEWS: [&str; 9] = [
    "Analytics",
    "Convert",
    "Price",
    "Price Plus",
    "LeniQ",
    "Insights",
    "Report Builder",
    "Credit Checks",
    "Application Module",
];

const PATH_REGEX: &str = r"^/signup(?:[/?#]|$)";
const LOGIN_PATH_REGEX: &str = r"^/login(?:[/?#]|$)";
const DROPDOWN_TIMEOUT: Duration = Duration::from_secs(5);
const OPTION_TIMEOUT: Duration = Duration::from_secs(2);

/// A landlord account to create. Passwords never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct LandlordSignup {
    /// Account email
    pub email: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Organisation name
    pub organisation: String,
    /// Contact phone
    pub phone: String,
    /// Users the landlord may invite
    pub user_limit: u32,
    /// Account password, typed twice
    pub password: String,
    /// Operator password authorising the signup
    pub admin_password: String,
    /// Options ticked in the "Assign Views" dropdown
    pub views: Vec<String>,
    /// Options ticked in the "Assign Dashboards" dropdown
    pub dashboards: Vec<String>,
}

impl LandlordSignup {
    /// Signup with placeholder personal details, every default view and
    /// the Executive Summary dashboard
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>, admin_password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: "Automation".to_string(),
            last_name: "Playwright".to_string(),
            organisation: "Automation Playwright Company".to_string(),
            phone: "1234567890".to_string(),
            user_limit: 1,
            password: password.into(),
            admin_password: admin_password.into(),
            views: DEFAULT_VIEWS.iter().map(|v| (*v).to_string()).collect(),
            dashboards: vec!["Executive Summary".to_string()],
        }
    }

    /// Set first and last name
    #[must_use]
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Set the organisation
    #[must_use]
    pub fn with_organisation(mut self, organisation: impl Into<String>) -> Self {
        self.organisation = organisation.into();
        self
    }

    /// Set the phone number
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Set how many users the landlord may invite
    #[must_use]
    pub const fn with_user_limit(mut self, limit: u32) -> Self {
        self.user_limit = limit;
        self
    }

    /// Replace the views to grant
    #[must_use]
    pub fn with_views<I, S>(mut self, views: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.views = views.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the dashboards to grant
    #[must_use]
    pub fn with_dashboards<I, S>(mut self, dashboards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dashboards = dashboards.into_iter().map(Into::into).collect();
        self
    }

    /// Credentials to log in with once the account exists
    #[must_use]
    pub fn credentials(&self) -> crate::config::Credentials {
        crate::config::Credentials::new(self.email.clone(), self.password.clone())
    }
}

impl fmt::Debug for LandlordSignup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LandlordSignup")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("organisation", &self.organisation)
            .field("phone", &self.phone)
            .field("user_limit", &self.user_limit)
            .field("password", &"<redacted>")
            .field("admin_password", &"<redacted>")
            .field("views", &self.views)
            .field("dashboards", &self.dashboards)
            .finish()
    }
}

/// Plus-addressed email that no earlier run has used: `local+1a2b3c4d@domain`
#[must_use]
pub fn unique_email(local: &str, domain: &str) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    format!("{local}+{}@{domain}", &tag[..8])
}

/// What the form answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Account created, browser sent to the login form
    Created {
        /// Login URL reached
        login_url: String,
    },
    /// The email already has an account
    AlreadyExists,
    /// The form reported another error
    Rejected {
        /// Error text shown
        message: String,
    },
}

/// The landlord signup form
#[derive(Debug, Clone)]
pub struct SignupPage {
    page: BoundPage,
    login: UrlPattern,
}

impl PageObject for SignupPage {
    fn page(&self) -> &BoundPage {
        &self.page
    }
}

impl SignupPage {
    /// Signup page for a session
    pub fn new(session: Session) -> PageResult<Self> {
        let model = PageModel::builder("signup")
            .with_path(SIGNUP_PATH)
            .with_path_regex(PATH_REGEX)
            .with_selectors("email", r#"input[type="email"], input[name="email"]"#)
            .with_selectors("first name", r#"input[name="firstName"], input[placeholder*="John"]"#)
            .with_selectors("last name", r#"input[name="lastName"], input[placeholder*="Doe"]"#)
            .with_selectors(
                "organisation",
                r#"input[name="organisationName"], input[placeholder*="Organisation"]"#,
            )
            .with_selectors("phone", r#"input[name="phone"], input[type="tel"]"#)
            .with_selectors("user limit", r#"input[type="number"], input[name="userLimit"]"#)
            .with_selectors("password", r#"input[name="password"]"#)
            .with_selectors("confirm password", r#"input[name="confirmPassword"]"#)
            .with_selectors("admin password", r#"input[name="adminPassword"]"#)
            .with_selectors("dropdowns", r#"select, [role="combobox"]"#)
            .with_selectors("submit", r#"button[type="submit"], button:has-text("Sign Up")"#)
            .with_selectors("already exists", &format!("text={ALREADY_EXISTS_MESSAGE}"))
            .with_selectors("error", "text=error")
            .build()?;
        Ok(Self {
            page: BoundPage::new(session, model),
            login: UrlPattern::path_regex(LOGIN_PATH_REGEX)?,
        })
    }

    /// Open the form; waits for `DOMContentLoaded` only, the page keeps
    /// polling afterwards
    pub async fn navigate(&self) -> PageResult<()> {
        let scope = self.page.action("navigate");
        let result = async {
            scope.navigate().await?;
            let ready = self
                .page
                .session()
                .policy(Condition::Loaded(LoadState::DomContentLoaded));
            scope.wait_until(&ready).await?;
            scope.verify_visible("email").await
        }
        .await;
        scope.finish(result)
    }

    /// Fill and submit the form on an already open page.
    ///
    /// The views and dashboards dropdowns are optional: a missing dropdown or
    /// option is logged and skipped. Waits for the first of a redirect to
    /// login, the "already exists" message or any error text.
    pub async fn sign_up(&self, signup: &LandlordSignup) -> PageResult<SignupOutcome> {
        let scope = self.page.action("sign_up");
        let result = self.submit(&scope, signup).await;
        scope.finish(result)
    }

    async fn submit(&self, scope: &ActionScope<'_>, signup: &LandlordSignup) -> PageResult<SignupOutcome> {
        scope.fill("email", &signup.email).await?;
        scope.fill("first name", &signup.first_name).await?;
        scope.fill("last name", &signup.last_name).await?;
        scope.fill("organisation", &signup.organisation).await?;
        scope.fill("phone", &signup.phone).await?;
        scope.fill("user limit", &signup.user_limit.to_string()).await?;
        scope.fill("password", &signup.password).await?;
        scope.fill("confirm password", &signup.password).await?;
        scope.fill("admin password", &signup.admin_password).await?;

        self.assign(scope, 0, "views", &signup.views).await?;
        self.assign(scope, 1, "dashboards", &signup.dashboards).await?;

        scope.click("submit").await?;
        let outcome = self.outcome(scope).await?;
        tracing::info!(email = %signup.email, outcome = ?outcome, "signup submitted");
        Ok(outcome)
    }

    /// Open the `index`th dropdown and click each option that shows up
    async fn assign(&self, scope: &ActionScope<'_>, index: usize, what: &str, options: &[String]) -> PageResult<()> {
        if options.is_empty() {
            return Ok(());
        }
        let session = self.page.session();
        let short = session.policy_with_timeout(Condition::Visible, DROPDOWN_TIMEOUT)?;
        let dropdowns = match scope.resolve_all(scope.spec("dropdowns")?, &short).await {
            Ok(found) => found,
            Err(err) if err.is_wait_failure() => Vec::new(),
            Err(err) => return Err(err),
        };
        let Some(dropdown) = dropdowns.get(index) else {
            tracing::warn!(dropdown = what, "dropdown not found, skipping");
            return Ok(());
        };
        scope.click_handle(dropdown).await?;

        let option_policy = session.policy_with_timeout(Condition::Visible, OPTION_TIMEOUT)?;
        for option in options {
            let spec = LocatorSpec::single(format!("{what} option '{option}'"), Selector::text(option.as_str()));
            match scope.resolve_spec(&spec, &option_policy).await {
                Ok(handle) => scope.click_handle(&handle).await?,
                Err(err) if err.is_wait_failure() => {
                    tracing::warn!(dropdown = what, option = %option, "option not offered, skipping");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    async fn outcome(&self, scope: &ActionScope<'_>) -> PageResult<SignupOutcome> {
        let session = self.page.session();
        let policy = session.policy(Condition::Visible);
        let login = &self.login;
        let exists = scope.spec("already exists")?;
        let error = scope.spec("error")?;

        scope.enter(ActionPhase::Waiting);
        poll_until(&policy, session.cancel_token(), "signup outcome", || async move {
            let url = session.current_url().await?;
            if login.matches(&url) {
                return Ok(Some(SignupOutcome::Created { login_url: url }));
            }
            let locator = session.locator();
            if locator.is_visible(exists).await? {
                return Ok(Some(SignupOutcome::AlreadyExists));
            }
            match locator.visible_matches(error).await?.first() {
                Some(shown) => {
                    let message = session.driver().text(shown).await?;
                    Ok(Some(SignupOutcome::Rejected {
                        message: message.trim().to_string(),
                    }))
                }
                None => Ok(None),
            }
        })
        .await
    }
}
