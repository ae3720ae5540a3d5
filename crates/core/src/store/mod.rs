//! Credential persistence behind one narrow capability trait.
//!
//! The state machine never knows which backend is active: it loads, saves,
//! deletes, and probes through [`CredentialStore`], and the backend is picked
//! from `[storage]` config by [`create_store`].

mod fs;
mod http;

pub use fs::FsCredentialStore;
pub use http::HttpCredentialStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::events::CredentialRecord;

/// Abstraction over credential persistence for the single managed session.
///
/// Implementations must make `delete` idempotent: a crash mid-delete may
/// leave a partial record set behind, and re-invoking `delete` still has to
/// converge to "no credentials present".
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load every persisted record for the session. Empty when none exist.
    async fn load(&self) -> Result<Vec<CredentialRecord>>;

    /// Durably write the given records. Errors must reach the caller; a
    /// credential update is not complete until this returns `Ok`.
    async fn save(&self, records: &[CredentialRecord]) -> Result<()>;

    /// Remove every record for the session. Succeeds when nothing exists.
    async fn delete(&self) -> Result<()>;

    /// Whether any records currently exist in the backing store.
    async fn exists(&self) -> Result<bool>;
}

/// Create the appropriate [`CredentialStore`] for the configured backend.
///
/// | `backend`    | Result                                      |
/// |--------------|---------------------------------------------|
/// | `filesystem` | [`FsCredentialStore`] (keyed dir of files)  |
/// | `remote`     | [`HttpCredentialStore`] (key-value service) |
pub fn create_store(cfg: &StorageConfig, session_id: &str) -> Result<Arc<dyn CredentialStore>> {
    match cfg.backend {
        StorageBackend::Filesystem => {
            let store = FsCredentialStore::new(&cfg.dir, session_id);
            tracing::info!(
                dir = %store.root().display(),
                "using filesystem credential store"
            );
            Ok(Arc::new(store))
        }
        StorageBackend::Remote => {
            let store = HttpCredentialStore::new(cfg, session_id)?;
            tracing::info!(
                base_url = %cfg.base_url,
                session_id = %session_id,
                "using remote credential store"
            );
            Ok(Arc::new(store))
        }
    }
}
