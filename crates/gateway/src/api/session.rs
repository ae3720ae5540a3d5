//! Session lifecycle API endpoints.
//!
//! Thin wrappers over [`wb_core::SessionManager`]: every handler delegates,
//! then answers with the freshest status snapshot so clients never need a
//! follow-up poll to learn what the operation did.

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use wb_core::StatusSnapshot;

use crate::state::AppState;

use super::api_error;

/// Serialize a snapshot in the wire shape shared by every session endpoint.
fn snapshot_json(snapshot: &StatusSnapshot) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "status": snapshot.status,
        "client_info": snapshot.client_info,
        "qr_code": snapshot.qr_code,
        "pairing_code": snapshot.pairing_code,
        "can_start": snapshot.can_start,
        "can_stop": snapshot.can_stop,
        "can_delete_auth": snapshot.can_delete_auth,
        "auth_exists": snapshot.auth_exists,
        "timestamp": snapshot.timestamp.to_rfc3339(),
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Current session status. Always `200`; the body says what is possible
/// next (`can_start` / `can_stop` / `can_delete_auth`).
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.manager.status().await;
    Json(snapshot_json(&snapshot))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/session/start
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Begin a connection attempt. `409` if a session is already active.
///
/// Returns as soon as the connection loop is launched; authentication
/// progress (QR challenge, pairing code) arrives via `GET /v1/session`
/// polling or the `/v1/session/events` stream.
pub async fn start_session(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = state.manager.start().await {
        return api_error(&e);
    }
    let snapshot = state.manager.status().await;
    Json(snapshot_json(&snapshot)).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/session/stop
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Disconnect and park the session. Credentials stay on disk, so the next
/// start reconnects without re-authentication. `409` if nothing is running.
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = state.manager.stop().await {
        return api_error(&e);
    }
    let snapshot = state.manager.status().await;
    Json(snapshot_json(&snapshot)).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /v1/session/auth
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Stop the session (if running) and wipe stored credentials. Idempotent;
/// always `200`, even when there was nothing to delete.
pub async fn delete_auth(State(state): State<AppState>) -> impl IntoResponse {
    state.manager.delete_auth().await;
    let snapshot = state.manager.status().await;
    Json(snapshot_json(&snapshot))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/session/pairing-code
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Request body for phone-number pairing.
#[derive(Debug, Deserialize)]
pub struct PairingCodeBody {
    /// Number to pair, in any human format (`"+1 (555) 123-4567"` works).
    pub phone_number: String,
}

/// Ask the transport for a pairing code as the QR-less authentication path.
///
/// `409` when no session is running, `400` when the number is unusable.
pub async fn request_pairing_code(
    State(state): State<AppState>,
    Json(body): Json<PairingCodeBody>,
) -> impl IntoResponse {
    match state.manager.request_pairing_code(&body.phone_number).await {
        Ok(code) => {
            tracing::info!(%code, "pairing code issued, enter it on the phone");
            Json(serde_json::json!({ "success": true, "pairing_code": code })).into_response()
        }
        Err(e) => api_error(&e),
    }
}
