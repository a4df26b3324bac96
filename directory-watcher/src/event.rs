//! File creation events from directory watching.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use notify::EventKind;
use notify::event::{AccessKind, AccessMode, CreateKind, ModifyKind};
use serde::{Deserialize, Serialize};

/// A newly created entry in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCreatedEvent {
    /// Raw path of the created entry, as reported by the backend.
    pub path: PathBuf,

    /// Whether the created entry is a directory.
    pub is_directory: bool,

    /// When the event was observed.
    pub detected_at: DateTime<Utc>,
}

impl FileCreatedEvent {
    /// Create an event for a regular file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
            detected_at: Utc::now(),
        }
    }

    /// Create an event for a directory.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
            detected_at: Utc::now(),
        }
    }

    /// Extract creation events from a raw backend notification.
    ///
    /// Anything other than a `Create` notification yields nothing. When the
    /// backend does not say what was created, the path is checked on disk.
    pub fn from_notify(event: notify::Event) -> Vec<Self> {
        let kind = match event.kind {
            EventKind::Create(kind) => kind,
            _ => return Vec::new(),
        };

        event
            .paths
            .into_iter()
            .map(|path| {
                let is_directory = match kind {
                    CreateKind::Folder => true,
                    CreateKind::File => false,
                    CreateKind::Any | CreateKind::Other => is_directory_on_disk(&path),
                };
                Self {
                    path,
                    is_directory,
                    detected_at: Utc::now(),
                }
            })
            .collect()
    }

    /// Final path component, if any.
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }
}

/// Whether the backend reports a writer closing a file.
const WAIT_FOR_CLOSE: bool = cfg!(target_os = "linux");

/// Holds created files back until their writer is done with them.
///
/// With inotify a new file is reported when the process that created it
/// closes it after writing, so a slow writer never hands out a half-written
/// file. Other backends have no close notification and report files as
/// soon as they appear. Directories are always reported right away.
#[derive(Debug, Default)]
pub struct CreationTracker {
    /// Files created but not yet closed by their writer.
    pending: HashSet<PathBuf>,
}

impl CreationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one backend notification; returns the entries now complete.
    pub fn observe(&mut self, event: notify::Event) -> Vec<FileCreatedEvent> {
        match event.kind {
            EventKind::Create(_) => {
                let mut ready = Vec::new();
                for created in FileCreatedEvent::from_notify(event) {
                    if WAIT_FOR_CLOSE && !created.is_directory {
                        self.pending.insert(created.path);
                    } else {
                        ready.push(created);
                    }
                }
                ready
            }
            // Rewrites of files that existed before are not creations.
            EventKind::Access(AccessKind::Close(AccessMode::Write)) => event
                .paths
                .into_iter()
                .filter(|path| self.pending.remove(path))
                .map(FileCreatedEvent::file)
                .collect(),
            EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => {
                for path in &event.paths {
                    self.pending.remove(path);
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Number of files still waiting for their writer.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

fn is_directory_on_disk(path: &Path) -> bool {
    // The entry may already be gone again; treat that as a file and let the
    // consumer report the missing path.
    std::fs::symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
