//! Session status enum and the snapshot returned by status queries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the single managed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session, or the remote side logged us out. Terminal until Start.
    Disconnected,
    /// Start accepted, transport connecting.
    Starting,
    /// A QR challenge is available for out-of-band scanning.
    QrReady,
    /// A pairing code was issued and must be entered on the remote device.
    PairingPending,
    /// Authenticated and ready to send.
    Connected,
    /// Connection dropped for a non-logout reason; retrying autonomously.
    Reconnecting,
    /// Stopped by explicit operator request. Credentials kept.
    Stopped,
    /// Credentials wiped by explicit operator request.
    AuthDeleted,
    /// A fatal internal failure (e.g. credential save) tore the session down.
    Error,
}

impl SessionStatus {
    /// Whether Start is allowed from this state.
    pub fn can_start(&self) -> bool {
        matches!(
            self,
            Self::Disconnected | Self::Stopped | Self::AuthDeleted | Self::Error
        )
    }

    /// Whether a transport handle may exist in this state.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Starting
                | Self::QrReady
                | Self::PairingPending
                | Self::Connected
                | Self::Reconnecting
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Starting => "starting",
            Self::QrReady => "qr_ready",
            Self::PairingPending => "pairing_pending",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Stopped => "stopped",
            Self::AuthDeleted => "auth_deleted",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection details inside a [`StatusSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub is_connected: bool,
    pub is_authenticated: bool,
    /// Bare phone number of the authenticated account, if connected.
    pub phone_number: Option<String>,
}

/// Point-in-time view of the session, safe to serialize straight to clients.
///
/// Built by the manager from its in-memory state plus a live existence check
/// against the credential store; never blocks on the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: SessionStatus,
    pub client_info: ClientInfo,
    /// Raw QR challenge payload while status is `qr_ready`.
    pub qr_code: Option<String>,
    /// Pairing code while status is `pairing_pending`.
    pub pairing_code: Option<String>,
    pub can_start: bool,
    pub can_stop: bool,
    pub can_delete_auth: bool,
    pub auth_exists: bool,
    pub timestamp: DateTime<Utc>,
}
