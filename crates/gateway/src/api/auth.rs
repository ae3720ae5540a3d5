//! Bearer-token gate for the protected routes.
//!
//! The token itself is never held in memory: [`token_hash_from_env`] digests
//! it once at startup and every request's header is digested and compared in
//! constant time. With no token configured the gate stays open (local
//! development); `/health` bypasses the gate entirely.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Digest the bearer token from `env_var`. Returns `None` (open mode) when
/// the variable is unset or empty, logging which way it went.
pub fn token_hash_from_env(env_var: &str) -> Option<Vec<u8>> {
    match std::env::var(env_var).ok().filter(|t| !t.is_empty()) {
        Some(token) => {
            tracing::info!(source = %format!("env:{env_var}"), "API bearer-token auth enabled");
            Some(Sha256::digest(token.as_bytes()).to_vec())
        }
        None => {
            tracing::warn!(
                "API bearer-token auth DISABLED — set the {env_var} env var to protect this server"
            );
            None
        }
    }
}

/// Middleware for the protected router; attach with
/// `middleware::from_fn_with_state`.
pub async fn require_api_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_token_hash.as_deref() else {
        return next.run(req).await;
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token_matches(expected, token) => next.run(req).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "success": false,
                "error": "invalid or missing API token",
            })),
        )
            .into_response(),
    }
}

/// Constant-time comparison of a presented token against the stored digest.
/// Digesting first keeps the comparison fixed-length, so the token's length
/// does not leak either.
fn token_matches(expected_hash: &[u8], presented: &str) -> bool {
    Sha256::digest(presented.as_bytes())
        .as_slice()
        .ct_eq(expected_hash)
        .into()
}
