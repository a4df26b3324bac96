//! Detect, submit, archive.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use torrent_handler_transmission::{SubmissionReceipt, TorrentSubmitter};
use torrent_handler_watcher::{DirectoryWatcher, FileCreatedEvent};

use crate::archive::{ensure_archive_dir, relocate};
use crate::config::HandlerConfig;
use crate::error::{Result, SubmissionError};
use crate::outcome::{FileOutcome, PipelineStats};

/// Processes created files one at a time.
///
/// Each eligible file is submitted first and archived second, so a failed
/// submission never loses the file and a failed move never loses a
/// submission. Every per-file error stops at [`process_file`](Self::process_file).
pub struct IngestPipeline {
    /// Where handled files go.
    archive_dir: PathBuf,

    /// Lower-cased extension, without the dot.
    target_suffix: String,

    /// Download directory passed with each submission.
    download_dir: String,

    /// Daemon client. `None` means degraded mode.
    submitter: Option<Arc<dyn TorrentSubmitter>>,
}

impl IngestPipeline {
    /// Build the pipeline, creating the archive directory if needed.
    ///
    /// Passing no submitter puts the pipeline in degraded mode: files are
    /// archived without being submitted.
    pub fn new(
        config: &HandlerConfig,
        submitter: Option<Arc<dyn TorrentSubmitter>>,
    ) -> Result<Self> {
        ensure_archive_dir(&config.archive_dir)?;

        if submitter.is_none() {
            warn!(
                "No submission client available; torrent files will be archived WITHOUT being added to the daemon"
            );
        }

        Ok(Self {
            archive_dir: config.archive_dir.clone(),
            target_suffix: config.target_suffix.to_lowercase(),
            download_dir: config.submission.download_dir.clone(),
            submitter,
        })
    }

    /// The archive directory.
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Whether files are being archived without submission.
    pub fn is_degraded(&self) -> bool {
        self.submitter.is_none()
    }

    /// Whether `path` has the target extension (case-insensitive).
    pub fn is_eligible(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.to_lowercase() == self.target_suffix)
    }

    /// Process one event from the watcher.
    pub async fn handle_event(&self, event: &FileCreatedEvent) -> FileOutcome {
        if event.is_directory {
            debug!("Ignoring directory: {}", event.path.display());
            return FileOutcome::Ignored;
        }
        self.process_file(&event.path).await
    }

    /// Run the whole submit-then-archive sequence for one path.
    ///
    /// Never fails: every error is logged and returned as an outcome.
    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        if !self.is_eligible(path) {
            debug!("Ignoring non-torrent file: {}", path.display());
            return FileOutcome::Ignored;
        }

        info!("New torrent file detected: {}", path.display());

        let receipt = match self.submit(path).await {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(
                    "Error submitting torrent file {}, leaving it in place: {e}",
                    path.display()
                );
                return FileOutcome::SubmissionFailed { error: e };
            }
        };

        match relocate(path, &self.archive_dir).await {
            Ok(destination) => {
                match receipt {
                    Some(ref r) => info!(
                        "Moved torrent file to: {} ({r})",
                        destination.display()
                    ),
                    None => warn!(
                        "Moved torrent file to: {} WITHOUT submitting it (submission disabled)",
                        destination.display()
                    ),
                }
                FileOutcome::Archived {
                    destination,
                    receipt,
                }
            }
            Err(e) => {
                if receipt.is_some() {
                    error!(
                        "Torrent {} was submitted but could not be archived; it may be submitted again if re-triggered: {e}",
                        path.display()
                    );
                } else {
                    error!("Error archiving torrent file {}: {e}", path.display());
                }
                FileOutcome::RelocationFailed { receipt, error: e }
            }
        }
    }

    /// Hand the file's bytes to the daemon.
    ///
    /// Returns `Ok(None)` without reading the file when there is no
    /// submitter.
    pub async fn submit(
        &self,
        path: &Path,
    ) -> std::result::Result<Option<SubmissionReceipt>, SubmissionError> {
        let Some(submitter) = self.submitter.as_ref() else {
            return Ok(None);
        };

        let metainfo = tokio::fs::read(path)
            .await
            .map_err(|source| SubmissionError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let receipt = submitter
            .submit(&metainfo, &self.download_dir)
            .await
            .map_err(|source| SubmissionError::Rejected {
                submitter: submitter.name().to_string(),
                source,
            })?;

        if receipt.is_duplicate() {
            info!(
                "{} already had torrent {}: {receipt}",
                submitter.name(),
                path.display()
            );
        } else {
            info!(
                "Successfully added torrent to {}: {receipt}",
                submitter.name()
            );
        }

        Ok(Some(receipt))
    }

    /// Consume events until `cancel` fires or the watcher stops.
    ///
    /// A file that is being processed when cancellation arrives is finished
    /// first. The watcher is stopped before returning.
    pub async fn run(
        &self,
        mut watcher: DirectoryWatcher,
        cancel: CancellationToken,
    ) -> PipelineStats {
        info!(
            "Starting torrent handler. Monitoring: {}",
            watcher.directory().display()
        );

        let mut stats = PipelineStats::default();

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = watcher.next_event() => match event {
                    Some(event) => event,
                    None => {
                        warn!("Event source closed");
                        break;
                    }
                },
            };

            let outcome = self.handle_event(&event).await;
            stats.record(&outcome);
        }

        watcher.stop();
        info!(
            "Torrent handler stopped: {} archived, {} archived unsubmitted, {} submission failures, {} relocation failures",
            stats.archived,
            stats.archived_unsubmitted,
            stats.submission_failures,
            stats.relocation_failures
        );

        stats
    }
}
