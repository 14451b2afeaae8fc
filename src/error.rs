//! Defines the app level error type and its conversion to rendered HTML pages.

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The host could not create a chart in an element.
    ///
    /// The dashboard logs this error and carries on with the other charts.
    #[error("could not create chart: {0}")]
    ChartMount(String),

    /// The dashboard data could not be parsed.
    ///
    /// Callers should pass in the parser's error message.
    #[error("invalid dashboard data: {0}")]
    InvalidDashboardData(String),

    /// The dashboard data file could not be read.
    #[error("could not read the dashboard data file: {0}")]
    DataFile(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),
}

#[cfg(not(target_arch = "wasm32"))]
mod response {
    use axum::{
        http::StatusCode,
        response::{Html, IntoResponse, Response},
    };

    use super::Error;
    use crate::{html::error_view, not_found::get_404_not_found_response};

    const DEFAULT_DESCRIPTION: &str = "Sorry, something went wrong.";
    const DEFAULT_FIX: &str = "Try again later or check the server logs.";

    impl IntoResponse for Error {
        fn into_response(self) -> Response {
            match self {
                Error::NotFound => get_404_not_found_response(),
                Error::JsonSerialization(_) => {
                    tracing::error!("Could not embed the dashboard data: {self}");
                    server_error_page(
                        "Could not load the dashboard",
                        "The dashboard data could not be prepared for the page. \
                            Check the server logs.",
                    )
                }
                // The details of other errors are for the logs, not the client.
                error => {
                    tracing::error!("An unexpected error occurred: {error}");
                    server_error_page(DEFAULT_DESCRIPTION, DEFAULT_FIX)
                }
            }
        }
    }

    fn server_error_page(description: &str, fix: &str) -> Response {
        let page = error_view("Internal Server Error", "500", description, fix);

        (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
    }

}
