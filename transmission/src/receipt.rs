//! What the daemon reports back for an added torrent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a torrent as reported by the daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentSummary {
    /// Daemon-local torrent id.
    #[serde(default)]
    pub id: Option<i64>,

    /// Torrent name.
    #[serde(default)]
    pub name: Option<String>,

    /// Info hash.
    #[serde(default, rename = "hashString")]
    pub hash: Option<String>,
}

impl fmt::Display for TorrentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.hash) {
            (Some(name), Some(hash)) => write!(f, "{name} ({hash})"),
            (Some(name), None) => write!(f, "{name}"),
            (None, Some(hash)) => write!(f, "{hash}"),
            (None, None) => write!(f, "<unnamed>"),
        }
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "torrent", rename_all = "snake_case")]
pub enum SubmissionReceipt {
    /// The daemon queued a new torrent.
    Added(TorrentSummary),

    /// The daemon already had this torrent.
    Duplicate(TorrentSummary),
}

impl SubmissionReceipt {
    /// The torrent the daemon now tracks.
    pub fn torrent(&self) -> &TorrentSummary {
        match self {
            Self::Added(t) | Self::Duplicate(t) => t,
        }
    }

    /// Whether the daemon already knew the torrent.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

impl fmt::Display for SubmissionReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added(t) => write!(f, "added {t}"),
            Self::Duplicate(t) => write!(f, "duplicate of {t}"),
        }
    }
}
