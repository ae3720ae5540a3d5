//! Filesystem implementation of [`CredentialStore`].
//!
//! Each record lives in its own JSON file under `<dir>/<session_id>/`,
//! mirroring the multi-file auth layout the transport protocol uses. The
//! file body carries the record itself, so the on-disk name only has to be
//! filesystem-safe, not reversible.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{BridgeError, Result};
use crate::events::CredentialRecord;
use crate::store::CredentialStore;

pub struct FsCredentialStore {
    root: PathBuf,
}

impl FsCredentialStore {
    pub fn new(dir: &Path, session_id: &str) -> Self {
        Self {
            root: dir.join(session_id),
        }
    }

    /// Directory holding this session's record files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Make a record key safe to use as a file name.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '-',
            c => c,
        })
        .collect()
}

#[async_trait]
impl CredentialStore for FsCredentialStore {
    async fn load(&self) -> Result<Vec<CredentialRecord>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        let mut records = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<CredentialRecord>(&raw) {
                Ok(record) => records.push(record),
                Err(e) => {
                    // A torn write from a crash; skip it rather than fail the
                    // whole load.
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping unreadable credential record"
                    );
                }
            }
        }

        Ok(records)
    }

    async fn save(&self, records: &[CredentialRecord]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        for record in records {
            let path = self.record_path(&record.key);
            let json = serde_json::to_vec(record)?;
            tokio::fs::write(&path, json).await.map_err(|e| {
                BridgeError::Storage(format!("writing {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BridgeError::Storage(format!(
                "removing {}: {e}",
                self.root.display()
            ))),
        }
    }

    async fn exists(&self) -> Result<bool> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(BridgeError::Io(e)),
        };
        // An empty leftover dir does not count as credentials.
        Ok(dir.next_entry().await?.is_some())
    }
}
