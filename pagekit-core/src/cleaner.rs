//! Output root removal.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Recursively deletes each path. Paths that do not exist are skipped.
pub async fn clean(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let metadata = match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Nothing to clean at {}", path.display());
                continue;
            }
            Err(e) => return Err(Error::fs(path, e)),
        };

        let removed = if metadata.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };

        match removed {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(Error::fs(path, e)),
        }
    }

    Ok(())
}
