//! Deciding where a run writes to and what it hard links against.
//!

use std::path::PathBuf;

use shared::{Context, SnapshotName, layout::IN_PROGRESS_FILE};
use thiserror::Error;
use tracing::info;

use crate::{
    catalog::SnapshotCatalog,
    latest::{LatestError, resolve_latest},
    safety::{SafetyCheckError, ensure_backup_destination},
    store::{SnapshotStore, StoreError},
};

/// Where the upcoming transfer writes and which snapshot it links against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The name of the snapshot being created.
    pub snapshot: SnapshotName,

    /// The directory the transfer writes into.
    pub dest: PathBuf,

    /// The snapshot unchanged files are hard linked against.
    pub link_base: Option<PathBuf>,

    /// If an interrupted snapshot was moved to `dest` to be completed.
    pub resumed: bool,
}

/// Resolves the destination and link base for a snapshot named `now`.
///
/// If the previous run was interrupted, its snapshot is renamed to `now` so the
/// transfer picks up where it stopped.
pub fn resolve_directories<S: SnapshotStore + ?Sized>(
    context: &mut Context,
    store: &S,
    now: &SnapshotName,
) -> Result<Resolution, ResolveError> {
    context.current_context = "Resolve";

    let root = store.root();
    let catalog = SnapshotCatalog::list(context, store);
    let latest = resolve_latest(context, store)?;

    let mut resolution = Resolution {
        snapshot: now.clone(),
        dest: root.join(now.as_str()),
        link_base: None,
        resumed: false,
    };

    let Some(most_recent) = catalog.most_recent() else {
        info!("{context}No previous backup - creating new one.");
        return Ok(resolution);
    };
    let most_recent_path = catalog.path_of(most_recent);

    let in_progress = store.exists(&root.join(IN_PROGRESS_FILE))?;

    if !in_progress {
        let link_base = latest.unwrap_or(most_recent_path);
        info!("{context}Previous backup found - doing incremental backup from {link_base:?}");

        resolution.link_base = Some(link_base);
        return Ok(resolution);
    }

    // The newest snapshot was left behind by an interrupted run, it becomes this run's destination.
    let initial_link_base = latest.clone().unwrap_or_else(|| most_recent_path.clone());

    if most_recent != now {
        ensure_backup_destination(store, root)?;

        info!(
            "{context}Previous backup failed or was interrupted - resuming from {most_recent_path:?}"
        );
        store.rename(&most_recent_path, &resolution.dest)?;
    }
    resolution.resumed = true;

    // The destination itself is never a link base.
    let usable = |path: &PathBuf| -> Result<bool, StoreError> {
        Ok(*path != resolution.dest && store.is_directory(path)?)
    };

    let link_base = if usable(&initial_link_base)? {
        Some(initial_link_base)
    } else {
        match latest {
            Some(latest) if usable(&latest)? => Some(latest),
            _ => catalog
                .second_most_recent()
                .map(|name| catalog.path_of(name)),
        }
    };
    resolution.link_base = link_base;

    match &resolution.link_base {
        Some(link_base) => info!("{context}Resumed backup links against {link_base:?}"),
        None => info!("{context}Resumed backup has no previous backup to link against"),
    }

    Ok(resolution)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{0}")]
    Latest(#[from] LatestError),

    #[error("{0}")]
    Safety(#[from] SafetyCheckError),

    #[error("Failed to resume the interrupted backup:\n{0}")]
    Store(#[from] StoreError),
}
