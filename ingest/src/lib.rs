//! # Ingest
//!
//! The torrent handler's core: for every file created in the watched
//! directory, decide whether it is a torrent, submit it to the daemon and
//! move it into the archive.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Ingestion Pipeline                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  FileCreatedEvent ──► is_eligible ──► submit ──► relocate      │
//! │                          │              │           │           │
//! │                          ▼              ▼           ▼           │
//! │                       Ignored   SubmissionFailed  Archived /    │
//! │                                                RelocationFailed │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Files are processed strictly one after another. Per-file errors are
//! logged and reported as a [`FileOutcome`]; only setup errors surface as
//! [`IngestError`].

pub mod archive;
pub mod config;
pub mod error;
pub mod outcome;
pub mod pipeline;

pub use archive::{ensure_archive_dir, relocate};
pub use config::HandlerConfig;
pub use error::{ConfigError, IngestError, RelocationError, Result, SubmissionError};
pub use outcome::{FileOutcome, PipelineStats};
pub use pipeline::IngestPipeline;
