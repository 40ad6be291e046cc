//! The `latest` link to the last completed snapshot.
//!

use std::path::PathBuf;

use shared::{Context, SnapshotName, layout::LATEST_LINK};
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{SnapshotStore, StoreError};

/// Resolves the directory `latest` points at.
///
/// `None` if there is no link or it points at a directory that does not exist.
/// A link that tries to leave the destination is an error.
pub fn resolve_latest<S: SnapshotStore + ?Sized>(
    context: &Context,
    store: &S,
) -> Result<Option<PathBuf>, LatestError> {
    let link = store.root().join(LATEST_LINK);

    if !store.exists(&link)? {
        return Ok(None);
    }

    let raw_target = store.read_link(&link)?;
    let target = validate_target(&raw_target)?;
    let target = store.root().join(target);

    if store.is_directory(&target)? {
        info!("{context}Sym link {link:?} targets an existing directory {target:?}");
        Ok(Some(target))
    } else {
        warn!(
            "{context}Sym link {link:?} points to non existing directory {target:?}. Ignoring sym link"
        );
        Ok(None)
    }
}

/// Points `latest` at `name`, replacing whatever was there.
pub fn publish_latest<S: SnapshotStore + ?Sized>(
    context: &Context,
    store: &S,
    name: &SnapshotName,
) -> Result<(), LatestError> {
    let link = store.root().join(LATEST_LINK);

    store.remove(&link)?;
    store.create_link(name.as_str(), &link)?;

    info!("{context}Sym link {link:?} now targets {name}");

    Ok(())
}

/// The link text must name a single entry in the destination root.
fn validate_target(raw_target: &str) -> Result<&str, LatestError> {
    let target = raw_target.trim_end_matches('/');

    let escapes = target.is_empty()
        || target.starts_with('.')
        || target.starts_with('/')
        || target.contains('/');

    if escapes {
        return Err(LatestError::Integrity(raw_target.to_string()));
    }

    Ok(target)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LatestError {
    #[error("Sym link integrity check failed, `latest` points to '{0}' which is not a directory in the destination")]
    Integrity(String),

    #[error("Failed to access `latest`:\n{0}")]
    Store(#[from] StoreError),
}
