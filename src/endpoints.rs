//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The dashboard data as JSON.
pub const DASHBOARD_API: &str = "/api/dashboard";
/// The route for static files.
pub const STATIC: &str = "/static";
