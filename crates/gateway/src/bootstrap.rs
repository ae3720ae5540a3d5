//! Startup wiring: credential store, transport, session manager, and the
//! background tasks tied to them.

use std::sync::Arc;

use wb_core::config::{Config, ConfigSeverity, TransportKind};
use wb_core::sim::SimTransport;
use wb_core::store::create_store;
use wb_core::transport::Transport;
use wb_core::SessionManager;

use crate::api::auth;
use crate::state::AppState;

/// Build the shared application state.
///
/// The session manager is constructed but never started here: connecting is
/// an explicit operator action via `POST /v1/session/start`.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Credential store ─────────────────────────────────────────────
    let store = create_store(&config.storage, &config.session.id)?;

    // ── Transport ────────────────────────────────────────────────────
    let transport: Arc<dyn Transport> = match config.transport.kind {
        TransportKind::Sim => {
            tracing::info!(
                identity = %config.transport.sim_identity,
                "using simulated transport"
            );
            Arc::new(SimTransport::new(&config.transport.sim_identity))
        }
    };

    // ── Session manager ──────────────────────────────────────────────
    let manager = SessionManager::new(&config, store, transport);
    let api_token_hash = auth::token_hash_from_env(&config.server.api_token_env);

    Ok(AppState {
        config,
        manager,
        api_token_hash,
    })
}

/// Spawn long-lived background tasks for the given state.
pub fn spawn_background_tasks(state: &AppState) {
    if state.config.session.log_qr {
        crate::qr::spawn_qr_logger(state.manager.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.dir = dir.path().to_path_buf();

        let state = build_app_state(Arc::new(config)).unwrap();
        assert_eq!(state.config.server.port, 3200);
    }
}
