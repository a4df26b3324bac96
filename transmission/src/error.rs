//! Error types for the Transmission client.

use thiserror::Error;

/// Result type alias for Transmission operations.
pub type Result<T> = std::result::Result<T, TransmissionError>;

/// Errors that can occur talking to the daemon.
#[derive(Error, Debug)]
pub enum TransmissionError {
    /// Transport failure (connection refused, timeout, ...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials were missing or wrong.
    #[error("unauthorized: check the RPC username and password")]
    Unauthorized,

    /// The daemon kept rejecting the session token.
    #[error("session id rejected by daemon")]
    SessionRejected,

    /// A 409 response without the session header.
    #[error("daemon answered 409 without a session id")]
    MissingSessionId,

    /// Unexpected HTTP status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The RPC call completed but the daemon reported a failure.
    #[error("daemon rejected request: {0}")]
    Rejected(String),

    /// The response did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
