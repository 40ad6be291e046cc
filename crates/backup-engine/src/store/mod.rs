//! Access to the filesystem holding the snapshots.
//!

use std::{
    io,
    path::{Path, PathBuf},
};

use regex::Regex;
use thiserror::Error;

use crate::transport::TransportError;

mod local;
mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

/// A destination filesystem, on this machine or behind a transport.
///
/// Operations are blocking and are issued one at a time.
pub trait SnapshotStore {
    /// The destination root, every snapshot lives directly under it.
    fn root(&self) -> &Path;

    /// The names of the directories directly inside `directory` that match `pattern`.
    fn list(&self, directory: &Path, pattern: &Regex) -> Result<Vec<String>, StoreError>;

    /// If anything exists at `path`. Symbolic links are not followed, so a dangling link exists.
    fn exists(&self, path: &Path) -> Result<bool, StoreError>;

    /// If `path` is, or links to, a directory.
    fn is_directory(&self, path: &Path) -> Result<bool, StoreError>;

    /// The raw text of the symbolic link at `path`.
    fn read_link(&self, path: &Path) -> Result<String, StoreError>;

    /// Moves `source` to `destination` without copying.
    fn rename(&self, source: &Path, destination: &Path) -> Result<(), StoreError>;

    /// Removes `path` and everything below it. Removing nothing is not an error.
    fn remove(&self, path: &Path) -> Result<(), StoreError>;

    /// Creates a symbolic link at `link_path` whose text is `target_name`.
    fn create_link(&self, target_name: &str, link_path: &Path) -> Result<(), StoreError>;

    /// The absolute form of `path` on the store's filesystem.
    fn resolve_absolute(&self, path: &Path) -> Result<String, StoreError>;

    /// Creates an empty file at `path` if there is none.
    fn touch(&self, path: &Path) -> Result<(), StoreError>;
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to {1} {2:?}:\n{0}")]
    Io(#[source] io::Error, &'static str, PathBuf),

    #[error("Failed to {1}, the transport failed:\n{0}")]
    Transport(#[source] TransportError, &'static str),

    #[error("Failed to {action}, `{command}` exited with {status:?}:\n{stderr}")]
    Command {
        action: &'static str,
        command: String,
        status: Option<i32>,
        stderr: String,
    },
}
