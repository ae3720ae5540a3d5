//! Shared configuration for the bridge, loaded from `wabridge.toml`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_3200")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Environment variable holding the API bearer token for protected
    /// endpoints. If the env var is set and non-empty, everything except
    /// `/health` requires `Authorization: Bearer <token>`. If unset, the
    /// server logs a warning and allows unauthenticated access.
    #[serde(default = "d_api_token_env")]
    pub api_token_env: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3200,
            host: "127.0.0.1".into(),
            cors: CorsConfig::default(),
            api_token_env: d_api_token_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed for CORS. Use `["*"]` for permissive (NOT recommended).
    /// Defaults to localhost-only.
    #[serde(default = "d_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_cors_origins(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Identifier under which credentials are persisted. One bridge process
    /// owns exactly one session, but distinct deployments can share a remote
    /// store by using distinct ids.
    #[serde(default = "d_session_id")]
    pub id: String,
    /// Render QR challenges to the service log as terminal art.
    #[serde(default = "d_true")]
    pub log_qr: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: d_session_id(),
            log_qr: true,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Credential storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "d_backend")]
    pub backend: StorageBackend,
    /// Credential directory for the `filesystem` backend.
    #[serde(default = "d_auth_dir")]
    pub dir: PathBuf,
    /// Base URL of the key-value service for the `remote` backend.
    #[serde(default = "d_store_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "d_8000")]
    pub timeout_ms: u64,
    #[serde(default = "d_3")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Filesystem,
    Remote,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Filesystem,
            dir: d_auth_dir(),
            base_url: d_store_url(),
            api_key: None,
            timeout_ms: 8000,
            max_retries: 3,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Transport
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "d_transport_kind")]
    pub kind: TransportKind,
    /// Account identity reported by the simulated transport once paired.
    #[serde(default = "d_sim_identity")]
    pub sim_identity: String,
}

/// Which transport implementation to run.
///
/// `sim` is the in-process loopback used for development and tests; real
/// protocol transports plug in behind the same trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Sim,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Sim,
            sim_identity: d_sim_identity(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reconnect policy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt.
    #[serde(default = "d_5000")]
    pub delay_ms: u64,
    /// Cap on the delay once `backoff_factor` grows it.
    #[serde(default = "d_5000")]
    pub max_delay_ms: u64,
    /// Multiplier applied after each failed attempt. `1.0` keeps the delay
    /// fixed, which matches the historical bridge behavior.
    #[serde(default = "d_factor")]
    pub backoff_factor: f64,
    /// Consecutive failures before giving up. `0` means unlimited.
    #[serde(default)]
    pub max_attempts: u32,
    /// Spread attempts by up to 25% extra delay.
    #[serde(default)]
    pub jitter: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay_ms: 5000,
            max_delay_ms: 5000,
            backoff_factor: 1.0,
            max_attempts: 0,
            jitter: false,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_3200() -> u16 {
    3200
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_cors_origins() -> Vec<String> {
    vec!["http://localhost:*".into(), "http://127.0.0.1:*".into()]
}
fn d_api_token_env() -> String {
    "WABRIDGE_API_TOKEN".into()
}
fn d_session_id() -> String {
    "default".into()
}
fn d_true() -> bool {
    true
}
fn d_backend() -> StorageBackend {
    StorageBackend::Filesystem
}
fn d_auth_dir() -> PathBuf {
    PathBuf::from("./wa-auth")
}
fn d_store_url() -> String {
    "http://localhost:7070".into()
}
fn d_8000() -> u64 {
    8000
}
fn d_3() -> u32 {
    3
}
fn d_transport_kind() -> TransportKind {
    TransportKind::Sim
}
fn d_sim_identity() -> String {
    "15550009999".into()
}
fn d_5000() -> u64 {
    5000
}
fn d_factor() -> f64 {
    1.0
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.session.id.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "session.id".into(),
                message: "session id must not be empty".into(),
            });
        }

        match self.storage.backend {
            StorageBackend::Filesystem => {
                if self.storage.dir.as_os_str().is_empty() {
                    errors.push(ConfigError {
                        severity: ConfigSeverity::Error,
                        field: "storage.dir".into(),
                        message: "credential dir must not be empty".into(),
                    });
                }
            }
            StorageBackend::Remote => {
                if self.storage.base_url.is_empty() {
                    errors.push(ConfigError {
                        severity: ConfigSeverity::Error,
                        field: "storage.base_url".into(),
                        message: "base_url must not be empty".into(),
                    });
                }
                if self.storage.api_key.is_none() {
                    errors.push(ConfigError {
                        severity: ConfigSeverity::Warning,
                        field: "storage.api_key".into(),
                        message: "remote store has no api_key configured".into(),
                    });
                }
            }
        }

        if self.reconnect.delay_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "reconnect.delay_ms".into(),
                message: "delay must be greater than 0 (hot-loop guard)".into(),
            });
        }

        if self.reconnect.backoff_factor < 1.0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "reconnect.backoff_factor".into(),
                message: "backoff_factor must be >= 1.0".into(),
            });
        }

        if self.server.cors.allowed_origins.len() == 1 && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins (not recommended for production)"
                    .into(),
            });
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
