use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration of the division engine server.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Division engine knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// JSON file with the member roster of every group.
    pub roster_path: PathBuf,
    /// Lifetime of an unconfirmed job.
    pub pending_ttl_seconds: u64,
    /// Upper bound on unconfirmed jobs kept across all groups.
    pub pending_capacity: u64,
    /// Upper bound on repair passes after the greedy assignment.
    pub repair_iterations: usize,
    /// Post-confirm navigation target; `{group_id}` is substituted.
    pub redirect_template: String,
}

/// Settings of the division client (CLI).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub group_id: u64,
    pub timeout_seconds: u64,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from("roster.json"),
            pending_ttl_seconds: 3600,
            pending_capacity: 10_000,
            repair_iterations: 50,
            redirect_template: "/groups/{group_id}".to_owned(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: "http://127.0.0.1:4583".to_owned(), group_id: 1, timeout_seconds: 30 }
    }
}
