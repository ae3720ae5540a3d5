//! Core of the WhatsApp bridge.
//!
//! Owns the single-session state machine (start, authenticate by QR or
//! pairing code, reconnect, stop, credential wipe), the pluggable credential
//! stores, and outbound message dispatch. The HTTP surface lives in
//! `wb-gateway`; everything here is transport- and server-agnostic.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod manager;
pub mod phone;
pub mod retry;
pub mod sim;
pub mod state;
pub mod store;
pub mod transport;

pub use config::{Config, StorageBackend, TransportKind};
pub use dispatch::SendReceipt;
pub use error::{BridgeError, Result};
pub use events::{CredentialRecord, DisconnectReason, TransportEvent};
pub use manager::SessionManager;
pub use state::{ClientInfo, SessionStatus, StatusSnapshot};
pub use store::{create_store, CredentialStore, FsCredentialStore, HttpCredentialStore};
pub use transport::{Transport, TransportHandle};
