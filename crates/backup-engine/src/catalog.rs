//! The snapshots present at a destination.
//!

use std::path::{Path, PathBuf};

use shared::{Context, SnapshotName};
use tracing::warn;

use crate::store::SnapshotStore;

/// The snapshot directories at a destination at the moment they were listed, newest first.
///
/// A catalog is never updated, list again after changing the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotCatalog {
    root: PathBuf,
    names: Vec<SnapshotName>,
}

impl SnapshotCatalog {
    /// Lists the snapshots in the store's root.
    ///
    /// A destination that can't be listed has no snapshots.
    pub fn list<S: SnapshotStore + ?Sized>(context: &Context, store: &S) -> Self {
        let root = store.root();

        let names = match store.list(root, SnapshotName::pattern()) {
            Ok(names) => names,
            Err(error) => {
                warn!("{context}Could not list snapshots in {root:?}: {error}");
                Vec::new()
            }
        };

        let names = names.iter().filter_map(|name| name.parse().ok());

        Self::from_names(root, names)
    }

    /// Creates a catalog from already known names.
    pub fn from_names(root: &Path, names: impl IntoIterator<Item = SnapshotName>) -> Self {
        let mut names: Vec<SnapshotName> = names.into_iter().collect();
        names.sort_by(|a, b| b.cmp(a));
        names.dedup();

        Self {
            root: root.to_path_buf(),
            names,
        }
    }

    /// The newest snapshot.
    pub fn most_recent(&self) -> Option<&SnapshotName> {
        self.names.first()
    }

    /// The snapshot before the newest one.
    pub fn second_most_recent(&self) -> Option<&SnapshotName> {
        self.names.get(1)
    }

    /// The oldest snapshot.
    pub fn oldest(&self) -> Option<&SnapshotName> {
        self.names.last()
    }

    /// The number of snapshots.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// If there are no snapshots.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The snapshots, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &SnapshotName> {
        self.names.iter()
    }

    /// The path of a snapshot in this catalog's destination.
    pub fn path_of(&self, name: &SnapshotName) -> PathBuf {
        self.root.join(name.as_str())
    }
}
