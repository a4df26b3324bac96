//! # Directory Watcher
//!
//! This crate bridges file system notifications into the torrent handler.
//! It watches a single directory (non-recursively) and surfaces a lazy,
//! infinite sequence of "file created" events.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Directory Watcher                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  notify backend ──► creation tracker ──► FileCreatedEvent       │
//! │   (own thread)    (wait for close-write)    (mpsc channel)      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod event;
pub mod watcher;

pub use error::{Result, WatcherError};
pub use event::{CreationTracker, FileCreatedEvent};
pub use watcher::DirectoryWatcher;
