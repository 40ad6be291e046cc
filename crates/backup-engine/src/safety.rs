//! Refusing to touch directories that are not backup destinations.
//!

use std::path::{Path, PathBuf};

use shared::layout::MARKER_FILE;
use thiserror::Error;

use crate::store::{SnapshotStore, StoreError};

/// Checks that `directory` holds the backup marker.
pub fn ensure_backup_destination<S: SnapshotStore + ?Sized>(
    store: &S,
    directory: &Path,
) -> Result<(), SafetyCheckError> {
    let marker = directory.join(MARKER_FILE);

    if !store.exists(&marker)? {
        return Err(SafetyCheckError::MissingMarker {
            directory: directory.to_path_buf(),
            marker,
        });
    }

    Ok(())
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum SafetyCheckError {
    #[error(
        "Safety check failed - the destination {directory:?} does not appear to be a backup folder or drive (marker file not found).\n\
         If it is indeed a backup folder, you may add the marker file by running the following command:\n\n    \
         mkdir -p -- {directory:?} ; touch {marker:?}"
    )]
    MissingMarker { directory: PathBuf, marker: PathBuf },

    #[error("Failed to check for the backup marker:\n{0}")]
    Store(#[from] StoreError),
}
