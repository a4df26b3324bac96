//! Error types for the ingestion pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline setup.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors that stop the handler before any file is processed.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The archive directory could not be created.
    #[error("cannot create archive directory {}: {source}", .path.display())]
    ArchiveDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Missing or invalid settings.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variables that were unset or empty.
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// A variable was set to something unusable.
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// The watch directory does not exist.
    #[error("watch directory does not exist: {}", .0.display())]
    WatchDirectoryMissing(PathBuf),

    /// The watch path is not a directory.
    #[error("watch path is not a directory: {}", .0.display())]
    WatchDirectoryNotADirectory(PathBuf),
}

/// Failure to hand one file to the daemon. The file stays where it is.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The daemon or the transport refused the submission.
    #[error("{submitter} rejected submission: {source}")]
    Rejected {
        submitter: String,
        #[source]
        source: torrent_handler_transmission::TransmissionError,
    },
}

/// Failure to move one file into the archive.
#[derive(Error, Debug)]
pub enum RelocationError {
    /// The path has no final component to keep.
    #[error("path has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    /// The archive already holds a file with this name.
    #[error("archive already contains {}", .0.display())]
    DestinationExists(PathBuf),

    /// The rename itself failed.
    #[error("cannot move {} to {}: {source}", .from.display(), .to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
