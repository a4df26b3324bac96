//! Connection settings for the Transmission daemon.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::DEFAULT_RPC_PATH;

/// How to reach the daemon and where it should download to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Daemon host name or address.
    pub host: String,

    /// Daemon RPC port.
    pub port: u16,

    /// RPC user, if authentication is enabled.
    pub username: Option<String>,

    /// RPC password.
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Download directory passed with every torrent.
    pub download_dir: String,

    /// Path of the RPC endpoint.
    pub rpc_path: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl SubmissionConfig {
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a config with default path and timeout and no credentials.
    pub fn new(host: impl Into<String>, port: u16, download_dir: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            download_dir: download_dir.into(),
            rpc_path: DEFAULT_RPC_PATH.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Set credentials.
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    /// Set the RPC path.
    pub fn with_rpc_path(mut self, path: impl Into<String>) -> Self {
        self.rpc_path = path.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full RPC endpoint URL.
    pub fn endpoint(&self) -> String {
        let path = if self.rpc_path.starts_with('/') {
            self.rpc_path.clone()
        } else {
            format!("/{}", self.rpc_path)
        };
        format!("http://{}:{}{path}", self.host, self.port)
    }
}
