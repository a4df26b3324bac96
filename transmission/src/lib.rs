//! # Transmission
//!
//! Client for the Transmission daemon's JSON RPC interface, reduced to what
//! the torrent handler needs: proving the daemon is reachable and adding a
//! torrent from raw metainfo bytes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Transmission Client                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  SubmissionConfig ──► TransmissionClient ──► SubmissionReceipt │
//! │                              │                                  │
//! │                              ▼                                  │
//! │                 session-id handshake (409)                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers depend on the [`TorrentSubmitter`] trait so the pipeline can be
//! driven by a fake in tests.

pub mod client;
pub mod config;
pub mod error;
pub mod receipt;

pub use client::{SessionInfo, TorrentSubmitter, TransmissionClient};
pub use config::SubmissionConfig;
pub use error::{Result, TransmissionError};
pub use receipt::{SubmissionReceipt, TorrentSummary};

/// Header carrying the CSRF session token.
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Default RPC endpoint path.
pub const DEFAULT_RPC_PATH: &str = "/transmission/rpc";
