use std::{
    fs::{self, OpenOptions},
    io::ErrorKind,
    os::unix::fs::symlink,
    path::{Path, PathBuf},
};

use regex::Regex;

use super::{SnapshotStore, StoreError};

/// A destination on a filesystem mounted on this machine.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SnapshotStore for LocalStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self, directory: &Path, pattern: &Regex) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(directory)
            .map_err(|e| StoreError::Io(e, "list", directory.to_path_buf()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io(e, "list", directory.to_path_buf()))?;

            // Does not follow symbolic links, `latest` is never listed.
            let file_type = entry
                .file_type()
                .map_err(|e| StoreError::Io(e, "get file type of", entry.path()))?;
            if !file_type.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if pattern.is_match(&name) {
                names.push(name);
            }
        }

        Ok(names)
    }

    fn exists(&self, path: &Path) -> Result<bool, StoreError> {
        match fs::symlink_metadata(path) {
            Ok(_) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(StoreError::Io(error, "check", path.to_path_buf())),
        }
    }

    fn is_directory(&self, path: &Path) -> Result<bool, StoreError> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(StoreError::Io(error, "check", path.to_path_buf())),
        }
    }

    fn read_link(&self, path: &Path) -> Result<String, StoreError> {
        let target =
            fs::read_link(path).map_err(|e| StoreError::Io(e, "read link", path.to_path_buf()))?;

        Ok(target.to_string_lossy().to_string())
    }

    fn rename(&self, source: &Path, destination: &Path) -> Result<(), StoreError> {
        fs::rename(source, destination)
            .map_err(|e| StoreError::Io(e, "rename", source.to_path_buf()))
    }

    fn remove(&self, path: &Path) -> Result<(), StoreError> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(StoreError::Io(error, "remove", path.to_path_buf())),
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        result.map_err(|e| StoreError::Io(e, "remove", path.to_path_buf()))
    }

    fn create_link(&self, target_name: &str, link_path: &Path) -> Result<(), StoreError> {
        symlink(target_name, link_path)
            .map_err(|e| StoreError::Io(e, "create link", link_path.to_path_buf()))
    }

    fn resolve_absolute(&self, path: &Path) -> Result<String, StoreError> {
        let absolute = fs::canonicalize(path)
            .map_err(|e| StoreError::Io(e, "resolve", path.to_path_buf()))?;

        Ok(absolute.to_string_lossy().to_string())
    }

    fn touch(&self, path: &Path) -> Result<(), StoreError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StoreError::Io(e, "create", path.to_path_buf()))?;

        Ok(())
    }
}
