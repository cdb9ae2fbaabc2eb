//! Request handlers for the control routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use super::{AppState, OK, UNKNOWN_PATH, UNKNOWN_REQUEST, UNRECOGNIZED_COMMAND, page};
use crate::controller::PowerController;

const SWITCH_PREFIX: &str = "/switch/";

/// Runs `f` against the controller on the blocking pool.
///
/// Both reads and switches may wait on a transition in progress, which
/// includes the settle delay.
async fn with_controller<T, F>(state: &AppState, f: F) -> Result<T, Response>
where
    F: FnOnce(&PowerController) -> T + Send + 'static,
    T: Send + 'static,
{
    let controller = Arc::clone(&state.controller);
    tokio::task::spawn_blocking(move || f(&controller))
        .await
        .map_err(|err| {
            error!(%err, "controller task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        })
}

/// `GET /` → control page with the current mode filled in.
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    match with_controller(&state, PowerController::current_mode).await {
        Ok(mode) => Html(page::render(mode)).into_response(),
        Err(resp) => resp,
    }
}

/// `GET /status` → `off`, `grid` or `inverter`.
pub async fn status(State(state): State<Arc<AppState>>) -> Response {
    match with_controller(&state, PowerController::current_mode).await {
        Ok(mode) => mode.as_str().into_response(),
        Err(resp) => resp,
    }
}

/// `POST /switch/{mode}` → `OK`, or `Unrecognized command` for an unknown mode.
///
/// The mode is taken from the raw path without percent-decoding, so only
/// the literal `/switch/off`, `/switch/grid` and `/switch/inverter` switch.
pub async fn switch(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let name = uri
        .path()
        .strip_prefix(SWITCH_PREFIX)
        .unwrap_or_default()
        .to_string();
    match with_controller(&state, move |controller| controller.set_mode_named(&name)).await {
        Ok(Ok(_)) => OK.into_response(),
        Ok(Err(_)) => (
            state.failure_status(StatusCode::BAD_REQUEST),
            UNRECOGNIZED_COMMAND,
        )
            .into_response(),
        Err(resp) => resp,
    }
}

/// Everything that matched no handler.
pub async fn fallback(State(state): State<Arc<AppState>>, method: Method) -> Response {
    let (status, body) = match method {
        Method::GET | Method::HEAD => (StatusCode::NOT_FOUND, UNKNOWN_PATH),
        Method::POST => (StatusCode::BAD_REQUEST, UNRECOGNIZED_COMMAND),
        _ => (StatusCode::METHOD_NOT_ALLOWED, UNKNOWN_REQUEST),
    };
    (state.failure_status(status), body).into_response()
}
