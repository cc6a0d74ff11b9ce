//! Concrete page objects for the compliance and analytics dashboards.

pub mod analytics;
pub mod compliance;
pub mod login;
pub mod report_builder;
pub mod signup;

pub use analytics::{AnalyticsPage, Dashboard, InsightExpectation};
pub use compliance::ComplianceReportsPage;
pub use login::LoginPage;
pub use report_builder::{ReportBuilderPage, ReportDraft};
pub use signup::{LandlordSignup, SignupOutcome, SignupPage};
