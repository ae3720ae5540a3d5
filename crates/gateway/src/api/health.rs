//! Liveness endpoint.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /health
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process liveness plus the current session status, for probes that want
/// to distinguish "server up" from "bridge connected".
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.manager.status().await;
    Json(serde_json::json!({
        "status": "ok",
        "service": "wabridge",
        "session": snapshot.status,
    }))
}
