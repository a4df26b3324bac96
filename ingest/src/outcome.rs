//! Terminal outcomes of processing one file.

use std::path::PathBuf;

use torrent_handler_transmission::SubmissionReceipt;

use crate::error::{RelocationError, SubmissionError};

/// How processing of a single created file ended.
#[derive(Debug)]
pub enum FileOutcome {
    /// Not a unit of work (directory or wrong suffix). Nothing was touched.
    Ignored,

    /// Moved into the archive. `receipt` is `None` when submission was
    /// disabled.
    Archived {
        destination: PathBuf,
        receipt: Option<SubmissionReceipt>,
    },

    /// Submission failed; the file was left where it was.
    SubmissionFailed { error: SubmissionError },

    /// The move failed after the submission step. The file is still at its
    /// original path; if `receipt` is set the daemon already has it.
    RelocationFailed {
        receipt: Option<SubmissionReceipt>,
        error: RelocationError,
    },
}

impl FileOutcome {
    /// Whether the file ended up in the archive.
    pub fn is_archived(&self) -> bool {
        matches!(self, Self::Archived { .. })
    }

    /// Whether the daemon accepted the file.
    pub fn was_submitted(&self) -> bool {
        match self {
            Self::Archived { receipt, .. } | Self::RelocationFailed { receipt, .. } => {
                receipt.is_some()
            }
            Self::Ignored | Self::SubmissionFailed { .. } => false,
        }
    }

    /// Whether this outcome needs operator attention.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::SubmissionFailed { .. } | Self::RelocationFailed { .. }
        )
    }
}

/// Running totals for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Events that were not units of work.
    pub ignored: usize,

    /// Files submitted and archived.
    pub archived: usize,

    /// Files archived without submission (degraded mode).
    pub archived_unsubmitted: usize,

    /// Files left in place after a failed submission.
    pub submission_failures: usize,

    /// Files left in place after a failed move.
    pub relocation_failures: usize,
}

impl PipelineStats {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Ignored => self.ignored += 1,
            FileOutcome::Archived { receipt: Some(_), .. } => self.archived += 1,
            FileOutcome::Archived { receipt: None, .. } => self.archived_unsubmitted += 1,
            FileOutcome::SubmissionFailed { .. } => self.submission_failures += 1,
            FileOutcome::RelocationFailed { .. } => self.relocation_failures += 1,
        }
    }

    /// Number of eligible files seen.
    pub fn processed(&self) -> usize {
        self.archived
            + self.archived_unsubmitted
            + self.submission_failures
            + self.relocation_failures
    }
}
