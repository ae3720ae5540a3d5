//! Outbound message API endpoints.

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use crate::state::AppState;

use super::api_error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Request body for sending a text message.
#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    /// Destination phone number, any human format.
    pub to: String,
    /// Message text.
    pub body: String,
}

/// Send one text message through the connected session.
///
/// Delivery is attempted exactly once. `409` when the session is not
/// connected, `400` on unusable input, `502` when the transport accepted
/// the request but could not deliver.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageBody>,
) -> impl IntoResponse {
    match state.manager.send_message(&body.to, &body.body).await {
        Ok(receipt) => Json(serde_json::json!({
            "success": true,
            "message_id": receipt.message_id,
            "timestamp": receipt.timestamp.to_rfc3339(),
        }))
        .into_response(),
        Err(e) => api_error(&e),
    }
}
