//! Spendboard is the budget dashboard of a personal finance app.
//!
//! The crate holds the dashboard's page logic: chart options, budget
//! progress bars, the theme toggle and a few interactive widgets. The logic
//! is written against the host traits in [context], which are implemented by
//! an in-memory page ([dom::VirtualDocument]) and, when compiled to
//! WebAssembly, by the browser (`web`).
//!
//! On other targets the crate also provides the web server that renders the
//! dashboard page and serves its data.

#![warn(missing_docs)]

pub mod context;
pub mod dashboard;
pub mod dom;
pub mod format;

mod error;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
mod app_state;
#[cfg(not(target_arch = "wasm32"))]
mod endpoints;
#[cfg(not(target_arch = "wasm32"))]
mod html;
#[cfg(not(target_arch = "wasm32"))]
mod logging;
#[cfg(not(target_arch = "wasm32"))]
mod navigation;
#[cfg(not(target_arch = "wasm32"))]
mod not_found;
#[cfg(not(target_arch = "wasm32"))]
mod routing;

#[cfg(test)]
mod test_utils;

pub use error::Error;

#[cfg(not(target_arch = "wasm32"))]
pub use server::*;

#[cfg(not(target_arch = "wasm32"))]
mod server {
    use std::{net::SocketAddr, time::Duration};

    use axum_server::Handle;
    use tokio::signal;

    pub use crate::app_state::AppState;
    pub use crate::logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
    pub use crate::routing::build_router;

    /// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
    /// then signals the server to shut down gracefully.
    ///
    /// `handle` is a handle to an Axum `Server`.
    pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
        let ctrl_c = async {
            if let Err(error) = signal::ctrl_c().await {
                tracing::error!("failed to install Ctrl+C handler: {error}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut terminate) => {
                    terminate.recv().await;
                }
                Err(error) => {
                    tracing::error!("failed to install signal handler: {error}");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::debug!("Received ctrl+c signal.");
                handle.graceful_shutdown(Some(Duration::from_secs(1)));
            },
            _ = terminate => {
                tracing::debug!("Received terminate signal.");
                handle.graceful_shutdown(Some(Duration::from_secs(1)));
            },
        }
    }
}
