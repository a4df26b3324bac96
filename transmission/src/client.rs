//! Transmission RPC client.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::SESSION_ID_HEADER;
use crate::config::SubmissionConfig;
use crate::error::{Result, TransmissionError};
use crate::receipt::{SubmissionReceipt, TorrentSummary};

/// Something that accepts torrent files for download.
#[async_trait]
pub trait TorrentSubmitter: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Hand raw metainfo bytes to the daemon, downloading into `download_dir`.
    async fn submit(&self, metainfo: &[u8], download_dir: &str) -> Result<SubmissionReceipt>;
}

/// Daemon details returned by `session-get`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionInfo {
    /// Daemon version string.
    #[serde(default)]
    pub version: Option<String>,

    /// RPC protocol version.
    #[serde(default, rename = "rpc-version")]
    pub rpc_version: Option<u32>,
}

/// Client for a single Transmission daemon.
pub struct TransmissionClient {
    /// Connection settings.
    config: SubmissionConfig,

    /// RPC endpoint URL.
    endpoint: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Last session token handed out by the daemon.
    session_id: RwLock<Option<String>>,

    /// Request tag counter.
    next_tag: AtomicU64,
}

impl TransmissionClient {
    /// Build a client without contacting the daemon.
    pub fn new(config: SubmissionConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            endpoint: config.endpoint(),
            config,
            client,
            session_id: RwLock::new(None),
            next_tag: AtomicU64::new(1),
        })
    }

    /// Build a client and prove the daemon is reachable.
    pub async fn connect(config: SubmissionConfig) -> Result<Self> {
        let client = Self::new(config)?;
        let session = client.session().await?;

        info!(
            "Connected to Transmission at {} (version {}, rpc {})",
            client.endpoint,
            session.version.as_deref().unwrap_or("unknown"),
            session
                .rpc_version
                .map_or_else(|| "unknown".to_string(), |v| v.to_string()),
        );

        Ok(client)
    }

    /// The RPC endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The settings this client was built from.
    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Fetch daemon session details.
    pub async fn session(&self) -> Result<SessionInfo> {
        self.call("session-get", json!({})).await
    }

    /// Add a torrent from raw metainfo bytes.
    pub async fn add_torrent(
        &self,
        metainfo: &[u8],
        download_dir: &str,
    ) -> Result<SubmissionReceipt> {
        let arguments = json!({
            "metainfo": STANDARD.encode(metainfo),
            "download-dir": download_dir,
        });

        let added: TorrentAddArguments = self.call("torrent-add", arguments).await?;

        match (added.added, added.duplicate) {
            (Some(torrent), _) => Ok(SubmissionReceipt::Added(torrent)),
            (None, Some(torrent)) => Ok(SubmissionReceipt::Duplicate(torrent)),
            (None, None) => Err(TransmissionError::InvalidResponse(
                "torrent-add returned neither torrent-added nor torrent-duplicate".to_string(),
            )),
        }
    }

    /// Run one RPC method and decode its `arguments`.
    async fn call<T: DeserializeOwned>(&self, method: &str, arguments: Value) -> Result<T> {
        let tag = self.next_tag.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "method": method,
            "arguments": arguments,
            "tag": tag,
        });

        debug!("Calling {method} (tag {tag})");

        let response = self.post(&body).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransmissionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rpc: RpcResponse = response.json().await?;
        if rpc.result != "success" {
            return Err(TransmissionError::Rejected(rpc.result));
        }

        Ok(serde_json::from_value(rpc.arguments.unwrap_or_else(|| json!({})))?)
    }

    /// POST a request, renewing the session token once if the daemon asks.
    async fn post(&self, body: &Value) -> Result<reqwest::Response> {
        let response = self.send(body).await?;
        if response.status() != StatusCode::CONFLICT {
            return check_auth(response);
        }

        let session_id = response
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or(TransmissionError::MissingSessionId)?;

        debug!("Renewed Transmission session id");
        *self.session_id.write().await = Some(session_id);

        let response = self.send(body).await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(TransmissionError::SessionRejected);
        }
        check_auth(response)
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response> {
        let mut request = self.client.post(&self.endpoint).json(body);

        if let Some(ref session_id) = *self.session_id.read().await {
            request = request.header(SESSION_ID_HEADER, session_id);
        }

        if let Some(ref username) = self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        Ok(request.send().await?)
    }
}

fn check_auth(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(TransmissionError::Unauthorized);
    }
    Ok(response)
}

#[async_trait]
impl TorrentSubmitter for TransmissionClient {
    fn name(&self) -> &str {
        "transmission"
    }

    async fn submit(&self, metainfo: &[u8], download_dir: &str) -> Result<SubmissionReceipt> {
        self.add_torrent(metainfo, download_dir).await
    }
}

/// RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TorrentAddArguments {
    #[serde(default, rename = "torrent-added")]
    added: Option<TorrentSummary>,
    #[serde(default, rename = "torrent-duplicate")]
    duplicate: Option<TorrentSummary>,
}
