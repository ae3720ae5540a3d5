//! HTTP gateway for the WhatsApp bridge.
//!
//! Hosts the REST + SSE surface over a [`wb_core::SessionManager`] and the
//! `wabridge` CLI (serve, config tooling, project init). Connection
//! lifecycle and message dispatch live in `wb-core`; this crate only maps
//! them onto the wire.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod qr;
pub mod state;

pub use state::AppState;
