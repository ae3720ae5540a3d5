//! HTTP surface tests: routing, auth, error mapping, and a full
//! start, pair, and send round trip against the simulated transport.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sha2::{Digest, Sha256};
use tower::ServiceExt;

use wb_core::config::Config;
use wb_core::sim::SimTransport;
use wb_core::store::create_store;
use wb_core::transport::Transport;
use wb_core::SessionManager;
use wb_gateway::{api, AppState};

fn test_state(dir: &tempfile::TempDir) -> (AppState, SimTransport) {
    let mut config = Config::default();
    config.storage.dir = dir.path().to_path_buf();
    config.reconnect.delay_ms = 50;
    config.reconnect.max_delay_ms = 50;
    let config = Arc::new(config);

    let store = create_store(&config.storage, &config.session.id).unwrap();
    let sim = SimTransport::new("15550001111");
    let transport: Arc<dyn Transport> = Arc::new(sim.clone());
    let manager = SessionManager::new(&config, store, transport);

    let state = AppState {
        config,
        manager,
        api_token_hash: None,
    };
    (state, sim)
}

fn app_for(state: AppState) -> Router {
    api::router(state.clone()).with_state(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `GET /v1/session` until the wire status matches, then return the
/// full payload. Panics after three seconds.
async fn wait_for_status(app: &Router, status: &str) -> serde_json::Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        let resp = app.clone().oneshot(get("/v1/session")).await.unwrap();
        let json = body_json(resp).await;
        if json["status"] == status {
            return json;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "session never reached {status}, last seen {}",
            json["status"]
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn health_is_public_even_with_auth_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, _sim) = test_state(&dir);
    state.api_token_hash = Some(Sha256::digest(b"secret").to_vec());
    let app = app_for(state);

    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "wabridge");
    assert_eq!(json["session"], "disconnected");
}

#[tokio::test]
async fn protected_routes_require_the_bearer_token() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, _sim) = test_state(&dir);
    state.api_token_hash = Some(Sha256::digest(b"secret").to_vec());
    let app = app_for(state);

    // Missing header; the rejection uses the same envelope as every other
    // API error.
    let resp = app.clone().oneshot(get("/v1/session")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "invalid or missing API token");

    // Wrong token.
    let req = Request::builder()
        .uri("/v1/session")
        .header("authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Correct token.
    let req = Request::builder()
        .uri("/v1/session")
        .header("authorization", "Bearer secret")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn no_token_configured_means_open_access() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _sim) = test_state(&dir);
    let app = app_for(state);

    let resp = app.oneshot(get("/v1/session")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn status_payload_has_the_wire_shape() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _sim) = test_state(&dir);
    let app = app_for(state);

    let resp = app.oneshot(get("/v1/session")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["status"], "disconnected");
    assert_eq!(json["can_start"], true);
    assert_eq!(json["can_stop"], false);
    assert_eq!(json["auth_exists"], false);
    assert_eq!(json["client_info"]["is_connected"], false);
    assert_eq!(json["client_info"]["phone_number"], serde_json::Value::Null);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn start_twice_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _sim) = test_state(&dir);
    let app = app_for(state);

    let resp = app.clone().oneshot(post("/v1/session/start")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);

    let resp = app.clone().oneshot(post("/v1/session/start")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("already running"));
}

#[tokio::test]
async fn stop_without_a_session_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _sim) = test_state(&dir);
    let app = app_for(state);

    let resp = app.oneshot(post("/v1/session/stop")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "not running");
}

#[tokio::test]
async fn delete_auth_is_always_ok() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _sim) = test_state(&dir);
    let app = app_for(state);

    let resp = app.oneshot(delete("/v1/session/auth")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["status"], "auth_deleted");
    assert_eq!(json["auth_exists"], false);
}

#[tokio::test]
async fn pairing_code_without_a_session_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _sim) = test_state(&dir);
    let app = app_for(state);

    let resp = app
        .oneshot(post_json(
            "/v1/session/pairing-code",
            serde_json::json!({ "phone_number": "+1 555 000 1111" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn send_while_disconnected_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _sim) = test_state(&dir);
    let app = app_for(state);

    let resp = app
        .oneshot(post_json(
            "/v1/messages",
            serde_json::json!({ "to": "15551234567", "body": "hi" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn blank_send_input_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _sim) = test_state(&dir);
    let app = app_for(state);

    // Input validation outranks the connectivity check.
    let resp = app
        .oneshot(post_json(
            "/v1/messages",
            serde_json::json!({ "to": "", "body": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn events_endpoint_is_a_stream() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _sim) = test_state(&dir);
    let app = app_for(state);

    let resp = app.oneshot(get("/v1/session/events")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(ct.starts_with("text/event-stream"));
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _sim) = test_state(&dir);
    let app = app_for(state);

    let resp = app.oneshot(get("/nonexistent")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_pair_and_send_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (state, sim) = test_state(&dir);
    let app = app_for(state);

    let resp = app.clone().oneshot(post("/v1/session/start")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    wait_for_status(&app, "qr_ready").await;
    sim.complete_pairing().await.unwrap();

    let json = wait_for_status(&app, "connected").await;
    assert_eq!(json["client_info"]["is_authenticated"], true);
    assert_eq!(json["auth_exists"], true);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/messages",
            serde_json::json!({ "to": "+1 (555) 123-4567", "body": "hello from the bridge" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert!(json["message_id"].as_str().unwrap().starts_with("3EB0"));
    assert!(json["timestamp"].is_string());

    let sent = sim.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].jid, "15551234567@s.whatsapp.net");
    assert_eq!(sent[0].body, "hello from the bridge");

    // Stop cleanly so the pump exits before the runtime tears down.
    let resp = app.clone().oneshot(post("/v1/session/stop")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "stopped");
}
