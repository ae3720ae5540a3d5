//! Outbound message dispatch.
//!
//! Delivery is at-most-once: one transport attempt per request, no internal
//! retry. Callers that want redelivery retry explicitly and accept the
//! duplicate risk themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::manager::SessionManager;
use crate::phone;
use crate::state::SessionStatus;

/// Proof that the transport accepted a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Transport-assigned message id.
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionManager {
    /// Send one text message to `destination`.
    ///
    /// The connected-state gate runs before destination normalization, so a
    /// malformed number against a down session reports `NotConnected`, not
    /// `InvalidInput`. Nothing reaches the transport unless the session is
    /// connected and the destination normalizes.
    pub async fn send_message(&self, destination: &str, body: &str) -> Result<SendReceipt> {
        if destination.trim().is_empty() || body.trim().is_empty() {
            return Err(BridgeError::InvalidInput(
                "destination and body are required".into(),
            ));
        }

        let handle = {
            let state = self.inner.state.read();
            if state.status != SessionStatus::Connected {
                return Err(BridgeError::NotConnected(state.status.to_string()));
            }
            state.handle.clone()
        };
        let Some(handle) = handle else {
            return Err(BridgeError::NotConnected("no transport handle".into()));
        };

        let jid = phone::normalize(destination)?;

        match handle.send_text(&jid, body).await {
            Ok(message_id) => {
                tracing::info!(jid = %jid, message_id = %message_id, "message sent");
                Ok(SendReceipt {
                    message_id,
                    timestamp: Utc::now(),
                })
            }
            Err(BridgeError::SendFailed(detail)) => Err(BridgeError::SendFailed(detail)),
            Err(other) => Err(BridgeError::SendFailed(other.to_string())),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::sim::SimTransport;
    use crate::store::FsCredentialStore;
    use crate::transport::Transport;

    async fn connected_manager(dir: &tempfile::TempDir) -> (SessionManager, SimTransport) {
        let sim = SimTransport::new("15550009999");
        let store = Arc::new(FsCredentialStore::new(dir.path(), "default"));
        let mgr = SessionManager::new(&Config::default(), store, Arc::new(sim.clone()));

        // Wire a live handle straight into the state, bypassing the pump.
        let (handle, _events) = sim
            .connect(vec![crate::events::CredentialRecord::new(
                "creds",
                &b"{}"[..],
            )])
            .await
            .unwrap();
        {
            let mut state = mgr.inner.state.write();
            state.status = SessionStatus::Connected;
            state.identity = Some("15550009999".into());
            state.handle = Some(Arc::from(handle));
        }
        (mgr, sim)
    }

    #[tokio::test]
    async fn rejects_blank_destination_and_body() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, sim) = connected_manager(&dir).await;

        let err = mgr.send_message("", "hello").await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidInput(_)));
        let err = mgr.send_message("+15551234567", "   ").await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidInput(_)));
        assert!(sim.sent().is_empty());
    }

    #[tokio::test]
    async fn not_connected_wins_over_bad_destination() {
        let dir = tempfile::tempdir().unwrap();
        let sim = SimTransport::new("15550009999");
        let store = Arc::new(FsCredentialStore::new(dir.path(), "default"));
        let mgr = SessionManager::new(&Config::default(), store, Arc::new(sim.clone()));

        // Destination is too short to normalize, but the session is down, so
        // the state error is the one reported.
        let err = mgr.send_message("12345", "hello").await.unwrap_err();
        assert!(matches!(err, BridgeError::NotConnected(_)));
        assert!(sim.sent().is_empty());
    }

    #[tokio::test]
    async fn bad_destination_never_reaches_transport() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, sim) = connected_manager(&dir).await;

        let err = mgr.send_message("12345", "hello").await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidInput(_)));
        assert!(sim.sent().is_empty());
    }

    #[tokio::test]
    async fn successful_send_returns_transport_receipt() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, sim) = connected_manager(&dir).await;

        let receipt = mgr
            .send_message("+1 (555) 123-4567", "hello there")
            .await
            .unwrap();

        let sent = sim.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].jid, "15551234567@s.whatsapp.net");
        assert_eq!(sent[0].body, "hello there");
        assert_eq!(sent[0].message_id, receipt.message_id);
    }

    #[tokio::test]
    async fn transport_failure_maps_to_send_failed() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, sim) = connected_manager(&dir).await;
        sim.set_fail_sends(Some("stream detached"));

        let err = mgr
            .send_message("15551234567", "hello")
            .await
            .unwrap_err();
        match err {
            BridgeError::SendFailed(detail) => assert!(detail.contains("stream detached")),
            other => panic!("expected SendFailed, got {other:?}"),
        }
    }
}
