//! HTTP control surface.
//!
//! - `GET /`: control page with the current mode filled in
//! - `GET /status`: current mode as plain text
//! - `POST /switch/{mode}`: switch to `off`, `grid` or `inverter`
//!
//! Anything else gets a plain-text error body. Unless
//! [`AppState::strict_status_codes`] is set, every response is `200 OK`.

mod handlers;
pub mod page;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tracing::{info, warn};

use crate::controller::PowerController;

/// Body for successful switch commands.
pub const OK: &str = "OK";
/// Body for GET requests to an unknown path.
pub const UNKNOWN_PATH: &str = "Unknown path";
/// Body for POST requests that are not a known switch command.
pub const UNRECOGNIZED_COMMAND: &str = "Unrecognized command";
/// Body for requests with any other method.
pub const UNKNOWN_REQUEST: &str = "Unknown request";

/// State shared across all request handlers.
#[derive(Debug)]
pub struct AppState {
    /// The single controller every request goes through.
    pub controller: Arc<PowerController>,
    /// Use 4xx codes for unknown paths and commands instead of 200.
    pub strict_status_codes: bool,
}

impl AppState {
    pub fn new(controller: Arc<PowerController>, strict_status_codes: bool) -> Self {
        Self {
            controller,
            strict_status_codes,
        }
    }

    /// Status code for a failed request: `failure` in strict mode, 200 otherwise.
    fn failure_status(&self, failure: StatusCode) -> StatusCode {
        if self.strict_status_codes {
            failure
        } else {
            StatusCode::OK
        }
    }
}

/// Builds the axum router with all control routes.
///
/// Known paths requested with the wrong method fall through to the same
/// handler as unknown paths.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index).fallback(handlers::fallback))
        .route("/status", get(handlers::status).fallback(handlers::fallback))
        .route(
            "/switch/{mode}",
            post(handlers::switch).fallback(handlers::fallback),
        )
        .fallback(handlers::fallback)
        .with_state(state)
}

/// Binds to `addr` and serves until Ctrl-C.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns the I/O error if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "control server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "cannot listen for Ctrl-C, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down control server");
}
