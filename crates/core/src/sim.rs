//! Simulated transport: a deterministic in-process loopback.
//!
//! Behaves like the real protocol at the [`Transport`] seam: connecting with
//! no credentials issues a QR challenge, connecting with credentials resumes
//! straight into an open session. Tests (and the `sim` dev transport) drive
//! the rest by injecting events through the control methods.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::{BridgeError, Result};
use crate::events::{CredentialRecord, DisconnectReason, TransportEvent};
use crate::transport::{Transport, TransportHandle};

/// A text payload accepted by the simulator, kept for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub jid: String,
    pub body: String,
    pub message_id: String,
}

struct SimInner {
    /// Bare phone number reported once "paired".
    identity: String,
    /// Issue a QR challenge when connecting without credentials.
    auto_qr: AtomicBool,
    /// Open immediately when connecting with credentials.
    auto_open: AtomicBool,
    /// When set, every send fails with this reason.
    fail_sends: Mutex<Option<String>>,
    /// Sender into the current connection's event channel.
    conn_tx: Mutex<Option<mpsc::Sender<TransportEvent>>>,
    connections: AtomicU64,
    sent: Mutex<Vec<SentMessage>>,
    pairing_requests: Mutex<Vec<String>>,
}

impl SimInner {
    fn account_id(&self) -> String {
        format!("{}:4@s.whatsapp.net", self.identity)
    }
}

#[derive(Clone)]
pub struct SimTransport {
    inner: Arc<SimInner>,
}

impl SimTransport {
    pub fn new(identity: &str) -> Self {
        Self {
            inner: Arc::new(SimInner {
                identity: identity.to_owned(),
                auto_qr: AtomicBool::new(true),
                auto_open: AtomicBool::new(true),
                fail_sends: Mutex::new(None),
                conn_tx: Mutex::new(None),
                connections: AtomicU64::new(0),
                sent: Mutex::new(Vec::new()),
                pairing_requests: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── scripting controls ───────────────────────────────────────────

    pub fn set_auto_qr(&self, on: bool) {
        self.inner.auto_qr.store(on, Ordering::SeqCst);
    }

    pub fn set_auto_open(&self, on: bool) {
        self.inner.auto_open.store(on, Ordering::SeqCst);
    }

    pub fn set_fail_sends(&self, reason: Option<&str>) {
        *self.inner.fail_sends.lock() = reason.map(str::to_owned);
    }

    /// Push an event into the current connection.
    pub async fn inject(&self, event: TransportEvent) -> Result<()> {
        let tx = self.inner.conn_tx.lock().clone();
        let Some(tx) = tx else {
            return Err(BridgeError::NotInitialized(
                "no live sim connection".into(),
            ));
        };
        tx.send(event).await.map_err(|_| {
            BridgeError::NotInitialized("sim connection receiver dropped".into())
        })
    }

    /// Finish authentication: emit a credential update followed by a session
    /// open, as the real protocol does after a scan or pairing entry.
    pub async fn complete_pairing(&self) -> Result<()> {
        self.inject(TransportEvent::CredentialsUpdated {
            records: vec![CredentialRecord::new("creds", &b"{\"sim\":true}"[..])],
        })
        .await?;
        self.inject(TransportEvent::Opened {
            account_id: self.inner.account_id(),
        })
        .await
    }

    /// Drop the connection with a non-logout reason.
    pub async fn drop_connection(&self, detail: &str) -> Result<()> {
        self.inject(TransportEvent::Closed {
            reason: DisconnectReason::ConnectionLost {
                detail: detail.to_owned(),
            },
        })
        .await
    }

    /// Terminate the session from the remote side.
    pub async fn logout(&self) -> Result<()> {
        self.inject(TransportEvent::Closed {
            reason: DisconnectReason::LoggedOut,
        })
        .await
    }

    // ── assertions ───────────────────────────────────────────────────

    /// Number of `connect` calls so far.
    pub fn connections(&self) -> u64 {
        self.inner.connections.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.inner.sent.lock().clone()
    }

    pub fn pairing_requests(&self) -> Vec<String> {
        self.inner.pairing_requests.lock().clone()
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn connect(
        &self,
        credentials: Vec<CredentialRecord>,
    ) -> Result<(Box<dyn TransportHandle>, mpsc::Receiver<TransportEvent>)> {
        let (tx, rx) = mpsc::channel(64);
        self.inner.connections.fetch_add(1, Ordering::SeqCst);
        *self.inner.conn_tx.lock() = Some(tx.clone());

        if credentials.is_empty() {
            if self.inner.auto_qr.load(Ordering::SeqCst) {
                let payload = format!("wa-sim://pair/{}", Uuid::new_v4());
                let _ = tx.send(TransportEvent::QrIssued { payload }).await;
            }
        } else if self.inner.auto_open.load(Ordering::SeqCst) {
            let _ = tx
                .send(TransportEvent::Opened {
                    account_id: self.inner.account_id(),
                })
                .await;
        }

        let handle = SimHandle {
            inner: self.inner.clone(),
            closed: AtomicBool::new(false),
        };
        Ok((Box::new(handle), rx))
    }
}

struct SimHandle {
    inner: Arc<SimInner>,
    closed: AtomicBool,
}

impl SimHandle {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BridgeError::NotInitialized("connection closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TransportHandle for SimHandle {
    async fn request_pairing_code(&self, jid: &str) -> Result<String> {
        self.ensure_open()?;
        self.inner.pairing_requests.lock().push(jid.to_owned());

        // Deterministic per destination, like a real code bound to a device.
        let mut hasher = DefaultHasher::new();
        jid.hash(&mut hasher);
        Ok(format!("{:08X}", hasher.finish() as u32))
    }

    async fn send_text(&self, jid: &str, body: &str) -> Result<String> {
        self.ensure_open()?;
        if let Some(reason) = self.inner.fail_sends.lock().clone() {
            return Err(BridgeError::SendFailed(reason));
        }

        let hex = Uuid::new_v4().simple().to_string().to_uppercase();
        let message_id = format!("3EB0{}", &hex[..16]);
        self.inner.sent.lock().push(SentMessage {
            jid: jid.to_owned(),
            body: body.to_owned(),
            message_id: message_id.clone(),
        });
        Ok(message_id)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
