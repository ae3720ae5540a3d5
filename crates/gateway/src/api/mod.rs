pub mod auth;
pub mod events;
pub mod health;
pub mod messages;
pub mod session;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use axum::Router;

use wb_core::BridgeError;

use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (no auth required) and **protected**
/// (gated behind the `WABRIDGE_API_TOKEN` bearer-token middleware).
///
/// `state` is needed to wire up the auth middleware at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        // Liveness (used by health probes)
        .route("/health", get(health::health));

    let protected = Router::new()
        // Session lifecycle
        .route("/v1/session", get(session::get_status))
        .route("/v1/session/start", post(session::start_session))
        .route("/v1/session/stop", post(session::stop_session))
        .route("/v1/session/auth", delete(session::delete_auth))
        .route("/v1/session/pairing-code", post(session::request_pairing_code))
        .route("/v1/session/events", get(events::session_events_sse))
        // Outbound messages
        .route("/v1/messages", post(messages::send_message))
        // Apply API auth middleware to all protected routes.
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}

/// Map a bridge error onto an HTTP response.
///
/// Lifecycle conflicts (start while running, stop while stopped, send while
/// disconnected) are `409`; bad caller input is `400`; a transport that took
/// the message but could not deliver it is `502`; everything else is `500`.
pub(crate) fn api_error(err: &BridgeError) -> Response {
    let status = match err {
        BridgeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        BridgeError::AlreadyRunning(_)
        | BridgeError::NotRunning
        | BridgeError::NotInitialized(_)
        | BridgeError::NotConnected(_) => StatusCode::CONFLICT,
        BridgeError::SendFailed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(serde_json::json!({ "success": false, "error": err.to_string() })),
    )
        .into_response()
}
