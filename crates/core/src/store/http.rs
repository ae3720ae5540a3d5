//! Remote key-value implementation of [`CredentialStore`].
//!
//! `HttpCredentialStore` wraps a `reqwest::Client` and keeps the session's
//! record set under `/kv/{session_id}` on a small key-value service, with
//! automatic retry + exponential back-off on transient (5xx / timeout)
//! failures. Records travel as JSON bodies so keys never need URL escaping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{BridgeError, Result};
use crate::events::CredentialRecord;
use crate::store::CredentialStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct HttpCredentialStore {
    http: Client,
    base_url: String,
    session_id: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl HttpCredentialStore {
    /// Build a new store client from the `[storage]` config section.
    pub fn new(cfg: &StorageConfig, session_id: &str) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Storage(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            session_id: session_id.to_owned(),
            api_key: cfg.api_key.clone(),
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Decorate a `RequestBuilder` with the standard bridge headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        let mut rb = rb
            .header("X-Client-Type", "wabridge")
            .header("X-Trace-Id", &trace_id);

        if let Some(ref key) = self.api_key {
            rb = rb.header("X-Api-Key", key);
        }
        rb
    }

    /// Build the full URL for a path like `/keys`, rooted at this session.
    fn url(&self, path: &str) -> String {
        format!("{}/kv/{}{}", self.base_url, self.session_id, path)
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient errors.
    ///
    /// * Retries on 5xx status codes and on timeouts.
    /// * Does **not** retry on 4xx (client errors are permanent).
    /// * Returns `Ok` on 404: "no record set" is a meaningful outcome of
    ///   this KV contract and callers inspect the status themselves.
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<BridgeError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let rb = self.decorate(build_request());
            match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_server_error() {
                        // 5xx — transient, retry
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(BridgeError::Storage(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                        continue;
                    }

                    if status.is_client_error() && status != StatusCode::NOT_FOUND {
                        // 4xx — permanent, do NOT retry
                        let body = resp.text().await.unwrap_or_default();
                        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                            return Err(BridgeError::Storage(format!(
                                "{endpoint} auth failed ({status}): {body}"
                            )));
                        }
                        return Err(BridgeError::Storage(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    last_err = Some(from_reqwest(e));
                    // Timeouts and connection errors are transient — retry
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| BridgeError::Storage(format!("{endpoint}: all retries exhausted"))))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl CredentialStore for HttpCredentialStore {
    async fn load(&self) -> Result<Vec<CredentialRecord>> {
        let url = self.url("");
        let resp = self
            .execute_with_retry("GET /kv/{session}", || self.http.get(&url))
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let body = resp.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| {
            BridgeError::Storage(format!("failed to parse record list: {e}: {body}"))
        })
    }

    async fn save(&self, records: &[CredentialRecord]) -> Result<()> {
        let url = self.url("");
        self.execute_with_retry("PUT /kv/{session}", || self.http.put(&url).json(records))
            .await?;
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        let url = self.url("");
        // 404 means nothing was there; that is a successful delete.
        self.execute_with_retry("DELETE /kv/{session}", || self.http.delete(&url))
            .await?;
        Ok(())
    }

    async fn exists(&self) -> Result<bool> {
        let url = self.url("/keys");
        let resp = self
            .execute_with_retry("GET /kv/{session}/keys", || self.http.get(&url))
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        let body = resp.text().await.map_err(from_reqwest)?;
        let keys: Vec<String> = serde_json::from_str(&body)
            .map_err(|e| BridgeError::Storage(format!("failed to parse key list: {e}: {body}")))?;
        Ok(!keys.is_empty())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error conversion helper
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into a [`BridgeError::Storage`].
fn from_reqwest(e: reqwest::Error) -> BridgeError {
    if e.is_timeout() {
        BridgeError::Storage(format!("timeout: {e}"))
    } else {
        BridgeError::Storage(e.to_string())
    }
}
