//! Application router configuration.

use std::path::Path;

use axum::{Router, response::Redirect, routing::get};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    dashboard::{get_dashboard_api, get_dashboard_page},
    endpoints,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
///
/// Static files are served from `static_dir`.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::DASHBOARD_API, get(get_dashboard_api))
        .nest_service(endpoints::STATIC, ServeDir::new(static_dir))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::http::StatusCode;
    use axum_test::TestServer;

    use super::build_router;
    use crate::{AppState, dashboard::DashboardData, endpoints};

    fn test_server(data: DashboardData) -> TestServer {
        let router = build_router(AppState::new(data), Path::new("static"));
        TestServer::new(router).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let server = test_server(DashboardData::default());

        let response = server.get(endpoints::ROOT).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn dashboard_page_is_html() {
        let server = test_server(DashboardData::default());

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_ok();
        assert!(response.text().contains("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn api_serves_json() {
        let data = DashboardData {
            top_expenses: vec![crate::dashboard::TopExpense {
                category: "Rent".to_owned(),
                total: 1200.0,
            }],
            ..Default::default()
        };
        let server = test_server(data.clone());

        let response = server.get(endpoints::DASHBOARD_API).await;

        response.assert_status_ok();
        assert_eq!(response.json::<DashboardData>(), data);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = test_server(DashboardData::default());

        let response = server.get("/does/not/exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("404"));
    }

    #[tokio::test]
    async fn serves_static_stylesheet() {
        let server = test_server(DashboardData::default());

        let response = server.get("/static/dashboard.css").await;

        response.assert_status_ok();
        assert!(response.text().contains(".dark-theme"));
    }
}
