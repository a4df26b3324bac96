//! Moving handled files into the archive directory.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{IngestError, RelocationError, Result};

/// Create the archive directory if it does not exist yet.
pub fn ensure_archive_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| IngestError::ArchiveDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Archive directory ready: {}", path.display());
    Ok(())
}

/// Move `source` into `archive_dir`, keeping its file name.
///
/// The move is a single rename, so the file is never present in both places
/// nor half-written in either. An existing file of the same name in the
/// archive is never replaced: the call fails and both files stay put. A
/// rename across filesystems fails rather than falling back to a copy.
pub async fn relocate(
    source: &Path,
    archive_dir: &Path,
) -> std::result::Result<PathBuf, RelocationError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| RelocationError::NoFileName(source.to_path_buf()))?;
    let destination = archive_dir.join(file_name);

    let io_error = |e: std::io::Error| RelocationError::Io {
        from: source.to_path_buf(),
        to: destination.clone(),
        source: e,
    };

    // Processing is sequential, so nothing else in this process can claim the
    // name between the check and the rename. Links count as taken even when
    // they dangle.
    match fs::symlink_metadata(&destination).await {
        Ok(_) => return Err(RelocationError::DestinationExists(destination)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_error(e)),
    }

    fs::rename(source, &destination).await.map_err(io_error)?;
    Ok(destination)
}
