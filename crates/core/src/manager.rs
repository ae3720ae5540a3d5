//! The session manager. Owns the lifecycle of the single messaging session.
//!
//! Control operations (start / stop / delete-auth / pairing) are serialized
//! through one async mutex so "check state, then mutate state and handle" is
//! a critical section: two racing Starts can never create two transports.
//! Status queries read a sync snapshot and never wait on the transport.
//!
//! Every connection is tagged with a generation number and a cancellation
//! token. Stop and DeleteAuth bump the generation and cancel the token, so a
//! reconnect scheduled before the Stop can neither fire nor resurrect the
//! session afterwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{BridgeError, Result};
use crate::events::{DisconnectReason, TransportEvent};
use crate::phone;
use crate::retry::RetryPolicy;
use crate::state::{ClientInfo, SessionStatus, StatusSnapshot};
use crate::store::CredentialStore;
use crate::transport::{Transport, TransportHandle};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Internal state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) struct SessionState {
    pub(crate) status: SessionStatus,
    pub(crate) qr_code: Option<String>,
    pub(crate) pairing_code: Option<String>,
    /// Bare phone number of the authenticated account; `Some` iff connected.
    pub(crate) identity: Option<String>,
    pub(crate) handle: Option<Arc<dyn TransportHandle>>,
}

impl SessionState {
    fn clear_transients(&mut self) {
        self.qr_code = None;
        self.pairing_code = None;
        self.identity = None;
    }
}

/// The connection currently owned by the manager, parked under the control
/// mutex.
struct ActiveConn {
    generation: u64,
    cancel: CancellationToken,
    pump: JoinHandle<()>,
}

/// What the event pump should do after applying an event.
enum Flow {
    Continue,
    /// Session opened; the reconnect attempt counter resets.
    Opened,
    /// Non-logout disconnect; schedule a retry.
    Reconnect,
    /// Terminal transition (logout, fatal failure, stale generation).
    Terminal,
}

enum Outcome {
    Retry,
    Finished,
    Cancelled,
}

pub(crate) struct ManagerInner {
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    root_cancel: CancellationToken,
    /// Serializes control operations.
    active: Mutex<Option<ActiveConn>>,
    pub(crate) state: RwLock<SessionState>,
    pub(crate) generation: AtomicU64,
    events_tx: broadcast::Sender<StatusSnapshot>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Manager
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cheaply cloneable handle to the one session this process manages.
#[derive(Clone)]
pub struct SessionManager {
    pub(crate) inner: Arc<ManagerInner>,
}

impl SessionManager {
    /// Build a manager over the given store and transport.
    ///
    /// The session is never started here: even with valid credentials on
    /// disk, connecting is an explicit operator action.
    pub fn new(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(32);
        Self {
            inner: Arc::new(ManagerInner {
                store,
                transport,
                policy: RetryPolicy::from(&config.reconnect),
                root_cancel: CancellationToken::new(),
                active: Mutex::new(None),
                state: RwLock::new(SessionState {
                    status: SessionStatus::Disconnected,
                    qr_code: None,
                    pairing_code: None,
                    identity: None,
                    handle: None,
                }),
                generation: AtomicU64::new(0),
                events_tx,
            }),
        }
    }

    /// Subscribe to the snapshot published on every state transition.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusSnapshot> {
        self.inner.events_tx.subscribe()
    }

    // ── status ───────────────────────────────────────────────────────

    /// Non-mutating status snapshot.
    ///
    /// Reads the in-memory state plus a live existence probe against the
    /// credential store. A failing probe degrades to `auth_exists = false`
    /// instead of erroring; the query itself always succeeds.
    pub async fn status(&self) -> StatusSnapshot {
        let auth_exists = match self.inner.store.exists().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "credential existence probe failed");
                false
            }
        };
        self.snapshot_with(auth_exists)
    }

    fn snapshot_with(&self, auth_exists: bool) -> StatusSnapshot {
        let s = self.inner.state.read();
        StatusSnapshot {
            status: s.status,
            client_info: ClientInfo {
                is_connected: s.status == SessionStatus::Connected,
                is_authenticated: s.identity.is_some(),
                phone_number: s.identity.clone(),
            },
            qr_code: s.qr_code.clone(),
            pairing_code: s.pairing_code.clone(),
            can_start: s.status.can_start(),
            // Mirrors stop()'s gate: the reconnect window has no handle
            // installed but the session is still stoppable.
            can_stop: s.status.is_active(),
            can_delete_auth: auth_exists,
            auth_exists,
            timestamp: Utc::now(),
        }
    }

    async fn publish(&self) {
        let snapshot = self.status().await;
        let _ = self.inner.events_tx.send(snapshot);
    }

    // ── control operations ───────────────────────────────────────────

    /// Begin a session. Allowed only from a terminal status; anything else
    /// is a conflict.
    pub async fn start(&self) -> Result<()> {
        let mut active = self.inner.active.lock().await;

        {
            let state = self.inner.state.read();
            if !state.status.can_start() {
                return Err(BridgeError::AlreadyRunning(state.status.to_string()));
            }
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = self.inner.root_cancel.child_token();

        {
            let mut state = self.inner.state.write();
            state.status = SessionStatus::Starting;
            state.clear_transients();
            state.handle = None;
        }
        tracing::info!(generation, "session starting");
        self.publish().await;

        let mgr = self.clone();
        let pump_cancel = cancel.clone();
        let pump = tokio::spawn(async move {
            mgr.connection_loop(generation, pump_cancel).await;
        });

        *active = Some(ActiveConn {
            generation,
            cancel,
            pump,
        });
        Ok(())
    }

    /// Stop the session and release the transport. Credentials are kept.
    pub async fn stop(&self) -> Result<()> {
        let mut active = self.inner.active.lock().await;

        let status = self.inner.state.read().status;
        if !status.is_active() {
            // A finished pump may still be parked here (logout, fatal error);
            // reap it, but the operation is still a conflict.
            if let Some(conn) = active.take() {
                conn.cancel.cancel();
                let _ = conn.pump.await;
            }
            return Err(BridgeError::NotRunning);
        }

        let Some(conn) = active.take() else {
            return Err(BridgeError::NotRunning);
        };

        tracing::info!(generation = conn.generation, "stopping session");

        // Invalidate the generation before cancelling so a retry that is
        // already past its sleep cannot re-install state.
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        conn.cancel.cancel();

        let handle = {
            let mut state = self.inner.state.write();
            state.status = SessionStatus::Stopped;
            state.clear_transients();
            state.handle.take()
        };
        if let Some(handle) = handle {
            handle.close().await;
        }

        if let Err(e) = conn.pump.await {
            tracing::debug!(error = %e, "connection task ended abnormally");
        }

        self.publish().await;
        Ok(())
    }

    /// Wipe persisted credentials, stopping any running transport first.
    ///
    /// Best-effort by contract: a storage failure is logged and the wipe
    /// still reports success. Re-invoking converges on whatever is left.
    pub async fn delete_auth(&self) {
        let mut active = self.inner.active.lock().await;

        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(conn) = active.take() {
            tracing::info!(
                generation = conn.generation,
                "stopping session before credential wipe"
            );
            conn.cancel.cancel();
            let handle = self.inner.state.write().handle.take();
            if let Some(handle) = handle {
                handle.close().await;
            }
            if let Err(e) = conn.pump.await {
                tracing::debug!(error = %e, "connection task ended abnormally");
            }
        }

        if let Err(e) = self.inner.store.delete().await {
            tracing::warn!(error = %e, "credential delete failed");
        }

        {
            let mut state = self.inner.state.write();
            state.status = SessionStatus::AuthDeleted;
            state.clear_transients();
            state.handle = None;
        }
        tracing::info!("credentials deleted");
        self.publish().await;
    }

    /// Ask the transport for a pairing code for `destination`.
    ///
    /// Requires a live connection (`NotInitialized` otherwise) and a
    /// normalizable destination (`InvalidInput` otherwise). On success the
    /// pairing path supersedes any pending QR challenge.
    pub async fn request_pairing_code(&self, destination: &str) -> Result<String> {
        let _active = self.inner.active.lock().await;

        let handle = self.inner.state.read().handle.clone();
        let Some(handle) = handle else {
            return Err(BridgeError::NotInitialized(
                "no active connection; start the session first".into(),
            ));
        };

        let jid = phone::normalize(destination)?;
        let code = handle.request_pairing_code(&jid).await?;

        let transitioned = {
            let mut state = self.inner.state.write();
            match state.status {
                SessionStatus::Starting
                | SessionStatus::QrReady
                | SessionStatus::PairingPending => {
                    state.status = SessionStatus::PairingPending;
                    state.pairing_code = Some(code.clone());
                    state.qr_code = None;
                    true
                }
                _ => false,
            }
        };

        if transitioned {
            tracing::info!(jid = %jid, "pairing code issued");
            self.publish().await;
        } else {
            // Already authenticated (or mid-reconnect); hand the code back
            // without disturbing the state machine.
            tracing::warn!(
                status = %self.inner.state.read().status,
                "pairing code requested outside an authentication flow"
            );
        }

        Ok(code)
    }

    /// Graceful process shutdown: cancel everything scheduled and stop a
    /// running session. Safe to call when nothing is running.
    pub async fn shutdown(&self) {
        self.inner.root_cancel.cancel();
        match self.stop().await {
            Ok(()) => {}
            Err(BridgeError::NotRunning) => {}
            Err(e) => tracing::warn!(error = %e, "stop during shutdown failed"),
        }
    }

    // ── connection pump ──────────────────────────────────────────────

    /// Drive one session generation: connect, consume events, and retry on
    /// non-logout drops until cancelled or terminal.
    async fn connection_loop(self, generation: u64, cancel: CancellationToken) {
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return;
            }

            let credentials = match self.inner.store.load().await {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(generation, error = %e, "credential load failed");
                    self.fail(generation, &format!("credential load: {e}")).await;
                    return;
                }
            };

            tracing::debug!(
                generation,
                records = credentials.len(),
                "opening transport connection"
            );

            let connected = tokio::select! {
                r = self.inner.transport.connect(credentials) => r,
                _ = cancel.cancelled() => return,
            };

            let (handle, mut events) = match connected {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(generation, attempt, error = %e, "transport connect failed");
                    if !self.wait_for_retry(generation, &cancel, &mut attempt).await {
                        return;
                    }
                    continue;
                }
            };

            let handle: Arc<dyn TransportHandle> = Arc::from(handle);
            if !self.install_handle(generation, &handle) {
                handle.close().await;
                return;
            }

            let mut saw_open = false;
            let outcome = loop {
                tokio::select! {
                    ev = events.recv() => match ev {
                        Some(ev) => match self.apply_event(generation, ev).await {
                            Flow::Continue => {}
                            Flow::Opened => saw_open = true,
                            Flow::Reconnect => break Outcome::Retry,
                            Flow::Terminal => break Outcome::Finished,
                        },
                        // The transport dropped its sender without a close
                        // event; treat it as a lost connection.
                        None => {
                            let synthetic = TransportEvent::Closed {
                                reason: DisconnectReason::ConnectionLost {
                                    detail: "event stream ended".into(),
                                },
                            };
                            match self.apply_event(generation, synthetic).await {
                                Flow::Terminal => break Outcome::Finished,
                                _ => break Outcome::Retry,
                            }
                        }
                    },
                    _ = cancel.cancelled() => break Outcome::Cancelled,
                }
            };

            handle.close().await;
            self.remove_handle(generation);

            match outcome {
                Outcome::Cancelled | Outcome::Finished => return,
                Outcome::Retry => {
                    if saw_open {
                        attempt = 0;
                    }
                    if !self.wait_for_retry(generation, &cancel, &mut attempt).await {
                        return;
                    }
                }
            }
        }
    }

    /// Wait out the reconnect delay. Returns `false` when the loop should
    /// end instead (cancelled, or the attempt budget is exhausted).
    async fn wait_for_retry(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        attempt: &mut u32,
    ) -> bool {
        if self.inner.policy.should_give_up(*attempt) {
            tracing::error!(
                generation,
                attempts = *attempt,
                "reconnect attempts exhausted"
            );
            self.fail(generation, "reconnect attempts exhausted").await;
            return false;
        }

        let delay = self.inner.policy.delay_for_attempt(*attempt);
        tracing::info!(
            generation,
            delay_ms = delay.as_millis() as u64,
            attempt = *attempt + 1,
            "reconnecting"
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => return false,
        }

        *attempt += 1;
        true
    }

    /// Single transition function for inbound transport events.
    async fn apply_event(&self, generation: u64, event: TransportEvent) -> Flow {
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "dropping event from a stale connection");
            return Flow::Terminal;
        }

        match event {
            TransportEvent::QrIssued { payload } => {
                let mut superseded = false;
                let current = self.write_if_current(generation, |state| {
                    if state.status == SessionStatus::PairingPending {
                        superseded = true;
                    } else {
                        state.status = SessionStatus::QrReady;
                        state.qr_code = Some(payload);
                        state.pairing_code = None;
                        state.identity = None;
                    }
                });
                if !current {
                    return Flow::Terminal;
                }
                if superseded {
                    // The operator chose the pairing path for this attempt.
                    tracing::debug!("qr refresh ignored while a pairing code is pending");
                } else {
                    tracing::info!(generation, "qr challenge issued");
                    self.publish().await;
                }
                Flow::Continue
            }

            TransportEvent::CredentialsUpdated { records } => {
                tracing::debug!(generation, records = records.len(), "credentials updated");
                if let Err(e) = self.inner.store.save(&records).await {
                    tracing::error!(generation, error = %e, "credential save failed");
                    self.fail(generation, &format!("credential save: {e}")).await;
                    return Flow::Terminal;
                }
                Flow::Continue
            }

            TransportEvent::Opened { account_id } => {
                let identity = phone::bare_identity(&account_id);
                let current = self.write_if_current(generation, |state| {
                    state.status = SessionStatus::Connected;
                    state.qr_code = None;
                    state.pairing_code = None;
                    state.identity = Some(identity.clone());
                });
                if !current {
                    return Flow::Terminal;
                }
                tracing::info!(generation, identity = %identity, "session connected");
                self.publish().await;
                Flow::Opened
            }

            TransportEvent::Closed { reason } => {
                let next = if reason.is_logged_out() {
                    SessionStatus::Disconnected
                } else {
                    SessionStatus::Reconnecting
                };
                let current = self.write_if_current(generation, |state| {
                    state.status = next;
                    state.clear_transients();
                    state.handle = None;
                });
                if !current {
                    return Flow::Terminal;
                }
                if reason.is_logged_out() {
                    tracing::warn!(generation, "remote logged out; re-authentication required");
                    self.publish().await;
                    Flow::Terminal
                } else {
                    tracing::warn!(
                        generation,
                        detail = %reason.detail(),
                        "connection lost"
                    );
                    self.publish().await;
                    Flow::Reconnect
                }
            }
        }
    }

    /// Fatal internal failure: tear down into the error state. The operator
    /// can Start again from there.
    async fn fail(&self, generation: u64, detail: &str) {
        let current = self.write_if_current(generation, |state| {
            state.status = SessionStatus::Error;
            state.clear_transients();
            state.handle = None;
        });
        if !current {
            return;
        }
        tracing::error!(generation, detail, "session failed");
        self.publish().await;
    }

    /// Run `mutate` on the session state only while `generation` is still
    /// current. The check happens under the same write lock as the mutation;
    /// Stop and DeleteAuth bump the generation and then write their terminal
    /// status under this lock, so a pump that raced past an earlier check can
    /// never overwrite theirs.
    fn write_if_current<F>(&self, generation: u64, mutate: F) -> bool
    where
        F: FnOnce(&mut SessionState),
    {
        let mut state = self.inner.state.write();
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        mutate(&mut state);
        true
    }

    fn install_handle(&self, generation: u64, handle: &Arc<dyn TransportHandle>) -> bool {
        self.write_if_current(generation, |state| {
            state.handle = Some(Arc::clone(handle));
        })
    }

    fn remove_handle(&self, generation: u64) {
        self.write_if_current(generation, |state| state.handle = None);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CredentialRecord;
    use crate::sim::SimTransport;
    use crate::store::FsCredentialStore;

    fn manager_with(dir: &tempfile::TempDir) -> (SessionManager, SimTransport) {
        let sim = SimTransport::new("15550009999");
        let store = Arc::new(FsCredentialStore::new(dir.path(), "default"));
        let mgr = SessionManager::new(&Config::default(), store, Arc::new(sim.clone()));
        (mgr, sim)
    }

    #[tokio::test]
    async fn fresh_manager_reports_disconnected_without_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, sim) = manager_with(&dir);

        let snap = mgr.status().await;
        assert_eq!(snap.status, SessionStatus::Disconnected);
        assert!(snap.can_start);
        assert!(!snap.can_stop);
        assert!(!snap.auth_exists);
        assert!(snap.qr_code.is_none());
        assert!(snap.pairing_code.is_none());
        assert_eq!(sim.connections(), 0);
    }

    #[tokio::test]
    async fn qr_event_sets_qr_ready_and_clears_pairing() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, _sim) = manager_with(&dir);
        let generation = mgr.inner.generation.load(Ordering::SeqCst);

        let flow = mgr
            .apply_event(
                generation,
                TransportEvent::QrIssued {
                    payload: "wa-sim://pair/abc".into(),
                },
            )
            .await;
        assert!(matches!(flow, Flow::Continue));

        let snap = mgr.status().await;
        assert_eq!(snap.status, SessionStatus::QrReady);
        assert_eq!(snap.qr_code.as_deref(), Some("wa-sim://pair/abc"));
        assert!(snap.pairing_code.is_none());
    }

    #[tokio::test]
    async fn qr_refresh_ignored_while_pairing_pending() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, _sim) = manager_with(&dir);
        let generation = mgr.inner.generation.load(Ordering::SeqCst);

        {
            let mut state = mgr.inner.state.write();
            state.status = SessionStatus::PairingPending;
            state.pairing_code = Some("ABCD1234".into());
        }

        mgr.apply_event(
            generation,
            TransportEvent::QrIssued {
                payload: "wa-sim://pair/refresh".into(),
            },
        )
        .await;

        let snap = mgr.status().await;
        assert_eq!(snap.status, SessionStatus::PairingPending);
        assert_eq!(snap.pairing_code.as_deref(), Some("ABCD1234"));
        assert!(snap.qr_code.is_none());
    }

    #[tokio::test]
    async fn opened_event_records_bare_identity() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, _sim) = manager_with(&dir);
        let generation = mgr.inner.generation.load(Ordering::SeqCst);

        let flow = mgr
            .apply_event(
                generation,
                TransportEvent::Opened {
                    account_id: "15551234567:17@s.whatsapp.net".into(),
                },
            )
            .await;
        assert!(matches!(flow, Flow::Opened));

        let snap = mgr.status().await;
        assert_eq!(snap.status, SessionStatus::Connected);
        assert!(snap.client_info.is_connected);
        assert!(snap.client_info.is_authenticated);
        assert_eq!(
            snap.client_info.phone_number.as_deref(),
            Some("15551234567")
        );
        assert!(snap.qr_code.is_none());
    }

    #[tokio::test]
    async fn logout_close_is_terminal_and_other_reasons_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, _sim) = manager_with(&dir);
        let generation = mgr.inner.generation.load(Ordering::SeqCst);

        let flow = mgr
            .apply_event(
                generation,
                TransportEvent::Closed {
                    reason: DisconnectReason::ConnectionLost {
                        detail: "stream errored (515)".into(),
                    },
                },
            )
            .await;
        assert!(matches!(flow, Flow::Reconnect));
        assert_eq!(mgr.status().await.status, SessionStatus::Reconnecting);

        let flow = mgr
            .apply_event(
                generation,
                TransportEvent::Closed {
                    reason: DisconnectReason::LoggedOut,
                },
            )
            .await;
        assert!(matches!(flow, Flow::Terminal));
        let snap = mgr.status().await;
        assert_eq!(snap.status, SessionStatus::Disconnected);
        assert!(snap.can_start);
    }

    #[tokio::test]
    async fn credential_update_persists_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, _sim) = manager_with(&dir);
        let generation = mgr.inner.generation.load(Ordering::SeqCst);

        mgr.apply_event(
            generation,
            TransportEvent::CredentialsUpdated {
                records: vec![CredentialRecord::new("creds", &b"blob"[..])],
            },
        )
        .await;

        assert!(mgr.status().await.auth_exists);
    }

    #[tokio::test]
    async fn stale_generation_events_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, _sim) = manager_with(&dir);
        let stale = mgr.inner.generation.load(Ordering::SeqCst).wrapping_sub(1);

        let flow = mgr
            .apply_event(
                stale,
                TransportEvent::Opened {
                    account_id: "15551234567:1@s.whatsapp.net".into(),
                },
            )
            .await;
        assert!(matches!(flow, Flow::Terminal));
        assert_eq!(mgr.status().await.status, SessionStatus::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_racing_a_stop_cannot_resurrect_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let (mgr, _sim) = manager_with(&dir);

        mgr.start().await.unwrap();
        let generation = mgr.inner.generation.load(Ordering::SeqCst);
        mgr.stop().await.unwrap();

        // A disconnect from the stopped connection arriving late must not
        // flip Stopped back to Reconnecting; that state has no pump behind
        // it, so neither start nor stop could ever clear it.
        let flow = mgr
            .apply_event(
                generation,
                TransportEvent::Closed {
                    reason: DisconnectReason::ConnectionLost {
                        detail: "socket died mid-stop".into(),
                    },
                },
            )
            .await;
        assert!(matches!(flow, Flow::Terminal));

        let snap = mgr.status().await;
        assert_eq!(snap.status, SessionStatus::Stopped);
        assert!(snap.can_start);
        assert!(!snap.can_stop);
    }
}
