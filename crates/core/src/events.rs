//! Inbound events emitted by a transport connection.
//!
//! The transport pushes these over an mpsc channel; the session manager
//! consumes them in a single state-transition function, so the whole state
//! machine is exercisable with synthetic events and no live socket.

use serde::{Deserialize, Serialize};

/// One opaque credential blob keyed within the session's record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Storage key, unique within the session (e.g. `creds`, `app-state-v1`).
    pub key: String,
    pub data: Vec<u8>,
}

impl CredentialRecord {
    pub fn new(key: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            data: data.into(),
        }
    }
}

/// Why the transport closed the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisconnectReason {
    /// The remote side explicitly invalidated the session. Credentials are
    /// dead; re-authentication from scratch is required.
    LoggedOut,
    /// Any other connection-level failure; eligible for automatic reconnect.
    ConnectionLost { detail: String },
}

impl DisconnectReason {
    pub fn is_logged_out(&self) -> bool {
        matches!(self, Self::LoggedOut)
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::LoggedOut => "logged out",
            Self::ConnectionLost { detail } => detail,
        }
    }
}

/// Event stream contract between a transport connection and the manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportEvent {
    /// A fresh QR challenge to render for out-of-band scanning.
    QrIssued { payload: String },
    /// Updated credential material. Must be durably written before the
    /// update counts as complete.
    CredentialsUpdated { records: Vec<CredentialRecord> },
    /// The session is open and authenticated. `account_id` is the raw
    /// transport identity (`15551234567:17@s.whatsapp.net` shape).
    Opened { account_id: String },
    /// The connection closed; the reason decides reconnect vs terminal.
    Closed { reason: DisconnectReason },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logout_reason_is_terminal_marker() {
        assert!(DisconnectReason::LoggedOut.is_logged_out());
        assert!(!DisconnectReason::ConnectionLost {
            detail: "stream errored".into()
        }
        .is_logged_out());
    }

    #[test]
    fn events_tag_by_type() {
        let ev = TransportEvent::Closed {
            reason: DisconnectReason::LoggedOut,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "closed");
        assert_eq!(json["reason"]["kind"], "logged_out");
    }
}
