//! Expiring old snapshots.
//!
//! Everything from the last day is kept, then one snapshot per day for about six
//! months, then one per month.
//!

use std::path::Path;

use chrono::NaiveDateTime;
use shared::{Context, SnapshotName};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    catalog::SnapshotCatalog,
    safety::{SafetyCheckError, ensure_backup_destination},
    store::{SnapshotStore, StoreError},
};

/// Snapshots younger than this are always kept.
pub const KEEP_ALL_SECONDS: i64 = 60 * 60 * 24;

/// Snapshots younger than this are kept one per day, older ones one per month.
pub const KEEP_DAILY_SECONDS: i64 = 15_768_000;

/// What to do after the destination ran out of space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceRecovery {
    /// The oldest snapshot was expired, the transfer should be retried.
    Retry {
        /// The snapshot that was expired.
        expired: SnapshotName,
    },

    /// There is no old snapshot left to make room with.
    Exhausted,
}

/// The snapshots in `catalog` that fall outside the retention policy at `now`.
///
/// Snapshots are compared to the one evaluated just before them, newest first,
/// whether or not that one was kept.
pub fn expired_snapshots(catalog: &SnapshotCatalog, now: NaiveDateTime) -> Vec<SnapshotName> {
    let mut expired = Vec::new();
    let mut previous: Option<&SnapshotName> = None;

    for name in catalog.iter() {
        let Some(timestamp) = name.timestamp() else {
            continue;
        };
        let age = now.signed_duration_since(timestamp).num_seconds();

        let is_expired = if age < KEEP_ALL_SECONDS {
            false
        } else if age < KEEP_DAILY_SECONDS {
            previous.is_some_and(|previous| previous.day() == name.day())
        } else {
            previous.is_some_and(|previous| previous.month() == name.month())
        };

        if is_expired {
            expired.push(name.clone());
        }
        previous = Some(name);
    }

    expired
}

/// Expires every snapshot outside the retention policy at `now`.
pub fn prune<S: SnapshotStore + ?Sized>(
    context: &mut Context,
    store: &S,
    now: NaiveDateTime,
) -> Result<Vec<SnapshotName>, ExpireError> {
    context.current_context = "Prune";

    let catalog = SnapshotCatalog::list(context, store);
    let expired = expired_snapshots(&catalog, now);

    for name in &expired {
        expire_snapshot(context, store, &catalog.path_of(name))?;
    }

    Ok(expired)
}

/// Makes room by expiring the oldest snapshot, as long as it is not the only one.
pub fn on_space_exhausted<S: SnapshotStore + ?Sized>(
    context: &mut Context,
    store: &S,
) -> Result<SpaceRecovery, ExpireError> {
    context.current_context = "Out Of Space";

    let catalog = SnapshotCatalog::list(context, store);

    let oldest = match catalog.oldest() {
        Some(oldest) if catalog.len() >= 2 => oldest,
        _ => {
            warn!("{context}No space left on device, and no old backup to delete.");
            return Ok(SpaceRecovery::Exhausted);
        }
    };

    warn!("{context}No space left on device - removing oldest backup and resuming.");
    expire_snapshot(context, store, &catalog.path_of(oldest))?;

    Ok(SpaceRecovery::Retry {
        expired: oldest.clone(),
    })
}

/// Deletes a snapshot, after checking its parent is a backup destination.
pub fn expire_snapshot<S: SnapshotStore + ?Sized>(
    context: &Context,
    store: &S,
    snapshot: &Path,
) -> Result<(), ExpireError> {
    let parent = snapshot
        .parent()
        .ok_or_else(|| ExpireError::NoParent(snapshot.display().to_string()))?;

    ensure_backup_destination(store, parent)?;

    info!("{context}Expiring {snapshot:?}");
    store.remove(snapshot)?;

    Ok(())
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ExpireError {
    #[error("Abort: '{0}' is not on a backup destination")]
    NoParent(String),

    #[error("{0}")]
    Safety(#[from] SafetyCheckError),

    #[error("Failed to expire a backup:\n{0}")]
    Store(#[from] StoreError),
}
