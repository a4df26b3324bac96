//! Directory watcher implementation.

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{Result, WatcherError};
use crate::event::{CreationTracker, FileCreatedEvent};

const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Watches one directory for newly created files.
///
/// The backend runs on its own thread and pushes events into a channel;
/// [`DirectoryWatcher::next_event`] drains it. Once stopped the watcher
/// cannot be restarted.
pub struct DirectoryWatcher {
    /// Watched directory (canonical form).
    directory: PathBuf,

    /// Internal notify watcher. `None` once stopped.
    watcher: Option<RecommendedWatcher>,

    /// Event receiver.
    event_rx: mpsc::Receiver<FileCreatedEvent>,
}

impl DirectoryWatcher {
    /// Start watching `directory` for created files.
    ///
    /// Only direct children are reported and directory creations are
    /// dropped. Where the backend supports it, a new file is reported once
    /// its writer has closed it. Fails if the directory is missing, is not
    /// a directory, or the backend refuses the watch.
    pub fn watch(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();

        if !directory.exists() {
            return Err(WatcherError::DirectoryNotFound(
                directory.display().to_string(),
            ));
        }

        if !directory.is_dir() {
            return Err(WatcherError::NotADirectory(directory.display().to_string()));
        }

        // Backends report paths relative to the form they were given (or the
        // resolved one on macOS), so watch the canonical path.
        let directory = directory.canonicalize()?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let root = directory.clone();
        let mut tracker = CreationTracker::new();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    for created in tracker.observe(event) {
                        if created.is_directory {
                            debug!("Ignoring created directory: {}", created.path.display());
                            continue;
                        }

                        if created.path.parent() != Some(root.as_path()) {
                            debug!("Ignoring nested entry: {}", created.path.display());
                            continue;
                        }

                        if let Err(e) = event_tx.blocking_send(created) {
                            error!("Failed to send file event: {e}");
                        }
                    }
                }
                Err(e) => {
                    error!("Watch error: {e}");
                }
            },
        )?;

        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        info!("Started watching: {}", directory.display());

        Ok(Self {
            directory,
            watcher: Some(watcher),
            event_rx,
        })
    }

    /// The directory being watched.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Check if the watcher is running.
    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }

    /// Wait for the next created file.
    ///
    /// Returns `None` only after [`stop`](Self::stop) once buffered events
    /// have been drained.
    pub async fn next_event(&mut self) -> Option<FileCreatedEvent> {
        self.event_rx.recv().await
    }

    /// Stop watching. Dropping the backend closes the event channel.
    pub fn stop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.unwatch(&self.directory) {
                debug!("Unwatch failed for {}: {e}", self.directory.display());
            }
            info!("Directory watcher stopped");
        }
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
