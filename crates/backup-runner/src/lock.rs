//! Keeping two runs from writing to the same destination.
//!

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

use thiserror::Error;
use tracing::warn;

/// How many times a stale lock is replaced before giving up.
const ATTEMPTS: usize = 3;

/// Holds the lock file until dropped.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    /// Creates the lock file, replacing it if the process that made it is gone.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, LockError> {
        let path = path.into();

        for _ in 0..ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    writeln!(file, "{}", process::id())
                        .map_err(|e| LockError::Io(e, "write", path.clone()))?;
                    return Ok(Self { path });
                }

                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    let contents = match fs::read_to_string(&path) {
                        Ok(contents) => contents,
                        Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                        Err(e) => return Err(LockError::Io(e, "read", path)),
                    };

                    let pid = contents.trim().parse::<u32>().ok();
                    if let Some(pid) = pid.filter(|pid| is_running(*pid)) {
                        return Err(LockError::AlreadyRunning { path, pid });
                    }

                    warn!("Replacing stale lock file {path:?}");
                    match fs::remove_file(&path) {
                        Ok(()) => continue,
                        Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                        Err(e) => return Err(LockError::Io(e, "remove", path)),
                    }
                }

                Err(e) => return Err(LockError::Io(e, "create", path)),
            }
        }

        Err(LockError::Contended(path))
    }

    /// The lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        release(&self.path);
    }
}

/// Removes the lock file, if it belongs to this process.
pub fn release(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    if contents.trim() != process::id().to_string() {
        return;
    }

    if let Err(e) = fs::remove_file(path) {
        warn!("Could not remove lock file {path:?}: {e}");
    }
}

fn is_running(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Another backup is already running as process {pid}, lock file {path:?}")]
    AlreadyRunning { path: PathBuf, pid: u32 },

    #[error("Could not take lock file {0:?}, it kept being recreated.")]
    Contended(PathBuf),

    #[error("Failed to {1} lock file {2:?}:\n{0}")]
    Io(#[source] io::Error, &'static str, PathBuf),
}
