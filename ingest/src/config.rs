//! Handler configuration loaded from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use torrent_handler_transmission::SubmissionConfig;

use crate::error::ConfigError;

/// Directory watched for new files.
pub const ENV_WATCH_DIR: &str = "DOWNLOAD_FOLDER";
/// Directory handled files are moved into.
pub const ENV_ARCHIVE_DIR: &str = "PROCESSED_FOLDER";
pub const ENV_HOST: &str = "TRANSMISSION_HOST";
pub const ENV_PORT: &str = "TRANSMISSION_PORT";
pub const ENV_DOWNLOAD_DIR: &str = "TRANSMISSION_DOWNLOAD_DIR";
pub const ENV_USERNAME: &str = "TRANSMISSION_USERNAME";
pub const ENV_PASSWORD: &str = "TRANSMISSION_PASSWORD";
pub const ENV_RPC_PATH: &str = "TRANSMISSION_RPC_PATH";
pub const ENV_TIMEOUT_SECS: &str = "TRANSMISSION_TIMEOUT_SECS";
pub const ENV_LOG_FILE: &str = "TORRENT_HANDLER_LOG_FILE";

/// Suffix of files that get submitted.
pub const DEFAULT_TARGET_SUFFIX: &str = "torrent";

/// Log file written next to the process unless overridden.
pub const DEFAULT_LOG_FILE: &str = "torrent_handler.log";

/// Everything the handler needs, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Directory to watch (non-recursively).
    pub watch_dir: PathBuf,

    /// Directory handled files are moved into.
    pub archive_dir: PathBuf,

    /// Extension that marks a file as eligible, without the dot.
    pub target_suffix: String,

    /// Daemon connection settings.
    pub submission: SubmissionConfig,

    /// Where to write the log file.
    pub log_file: PathBuf,
}

impl HandlerConfig {
    /// Create a config with the default suffix and log file.
    pub fn new(
        watch_dir: impl Into<PathBuf>,
        archive_dir: impl Into<PathBuf>,
        submission: SubmissionConfig,
    ) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            archive_dir: archive_dir.into(),
            target_suffix: DEFAULT_TARGET_SUFFIX.to_string(),
            submission,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }

    /// Set the target suffix. A leading dot and case are ignored.
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.target_suffix = normalize_suffix(suffix);
        self
    }

    /// Set the log file path.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    /// Load from the process environment and validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an arbitrary key lookup without touching the filesystem.
    ///
    /// Every missing required key is reported at once. Empty values count
    /// as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut require = |key: &'static str| {
            let value = get(key);
            if value.is_none() {
                missing.push(key);
            }
            value
        };

        let watch_dir = require(ENV_WATCH_DIR);
        let archive_dir = require(ENV_ARCHIVE_DIR);
        let host = require(ENV_HOST);
        let port = require(ENV_PORT);
        let download_dir = require(ENV_DOWNLOAD_DIR);

        let (Some(watch_dir), Some(archive_dir), Some(host), Some(port), Some(download_dir)) =
            (watch_dir, archive_dir, host, port, download_dir)
        else {
            return Err(ConfigError::Missing(missing));
        };

        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid {
                key: ENV_PORT,
                reason: format!("{port:?} is not a port number: {e}"),
            })?;

        let mut submission = SubmissionConfig::new(host.trim(), port, download_dir)
            .with_credentials(get(ENV_USERNAME), get(ENV_PASSWORD));

        if let Some(path) = get(ENV_RPC_PATH) {
            submission = submission.with_rpc_path(path.trim());
        }

        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::Invalid {
                    key: ENV_TIMEOUT_SECS,
                    reason: format!("{secs:?} is not a number of seconds: {e}"),
                })?;
            submission = submission.with_timeout(Duration::from_secs(secs));
        }

        let mut config = Self::new(watch_dir, archive_dir, submission);
        if let Some(log_file) = get(ENV_LOG_FILE) {
            config = config.with_log_file(log_file);
        }

        Ok(config)
    }

    /// Check the watch directory exists and the archive is a different place.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.watch_dir.exists() {
            return Err(ConfigError::WatchDirectoryMissing(self.watch_dir.clone()));
        }

        if !self.watch_dir.is_dir() {
            return Err(ConfigError::WatchDirectoryNotADirectory(
                self.watch_dir.clone(),
            ));
        }

        if same_location(&self.watch_dir, &self.archive_dir) {
            return Err(ConfigError::Invalid {
                key: ENV_ARCHIVE_DIR,
                reason: "must differ from the watch directory".to_string(),
            });
        }

        Ok(())
    }
}

fn normalize_suffix(suffix: &str) -> String {
    suffix.trim().trim_start_matches('.').to_lowercase()
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
