//! Transport seam between the session manager and the messaging network.
//!
//! A [`Transport`] opens connections; each connection yields an exclusively
//! owned [`TransportHandle`] plus an inbound [`TransportEvent`] stream. The
//! manager drives its state machine purely off that stream, so any protocol
//! implementation (or a scripted simulator) plugs in here.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::events::{CredentialRecord, TransportEvent};

/// A live connection to the messaging network.
#[async_trait]
pub trait TransportHandle: Send + Sync {
    /// Request a pairing code for the given JID. The code must be entered on
    /// the remote device instead of scanning a QR challenge.
    async fn request_pairing_code(&self, jid: &str) -> Result<String>;

    /// Send a single text payload. Returns the transport's message id.
    async fn send_text(&self, jid: &str, body: &str) -> Result<String>;

    /// Close the connection. The event stream ends shortly after; no events
    /// for this connection may be acted on once the manager has detached.
    async fn close(&self);
}

/// Connection factory. One `connect` call per Start or reconnect attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection, seeding it with previously persisted credentials
    /// (empty on a fresh session). Returns immediately; authentication
    /// progress arrives as events on the returned channel.
    async fn connect(
        &self,
        credentials: Vec<CredentialRecord>,
    ) -> Result<(Box<dyn TransportHandle>, mpsc::Receiver<TransportEvent>)>;
}
