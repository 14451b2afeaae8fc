//! The 404 page, shown for unknown routes and missing resources.

use axum::{
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// The fallback handler for routes the router does not know.
pub async fn get_404_not_found(uri: Uri) -> Response {
    tracing::debug!("No route for {uri}");
    get_404_not_found_response()
}

/// The 404 page as a response, for handlers that find nothing to show.
pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "Not Found",
        "404",
        "There is nothing here.",
        "The page may have moved. Your budgets and charts are on the dashboard.",
    );

    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}
