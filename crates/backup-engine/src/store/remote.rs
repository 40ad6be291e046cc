use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::transport::{CommandOutput, Transport};

use super::{SnapshotStore, StoreError};

/// A destination on another host, every operation is a command sent through `T`.
#[derive(Debug, Clone)]
pub struct RemoteStore<T> {
    root: PathBuf,
    transport: T,
}

impl<T: Transport> RemoteStore<T> {
    /// Creates a store rooted at `root` on the host behind `transport`.
    pub fn new(root: impl Into<PathBuf>, transport: T) -> Self {
        Self {
            root: root.into(),
            transport,
        }
    }

    /// The transport commands are sent through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs a command that must succeed.
    fn run(&self, action: &'static str, command: String) -> Result<CommandOutput, StoreError> {
        let output = self.execute(action, &command)?;

        if !output.success() {
            return Err(StoreError::Command {
                action,
                command,
                status: output.status,
                stderr: output.stderr,
            });
        }

        Ok(output)
    }

    /// Runs a `test` command, exit status 1 is a negative answer rather than a failure.
    fn test(&self, action: &'static str, command: String) -> Result<bool, StoreError> {
        let output = self.execute(action, &command)?;

        match output.status {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            status => Err(StoreError::Command {
                action,
                command,
                status,
                stderr: output.stderr,
            }),
        }
    }

    fn execute(&self, action: &'static str, command: &str) -> Result<CommandOutput, StoreError> {
        debug!("Remote: {command}");

        self.transport
            .execute(command)
            .map_err(|e| StoreError::Transport(e, action))
    }
}

impl<T: Transport> SnapshotStore for RemoteStore<T> {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self, directory: &Path, pattern: &Regex) -> Result<Vec<String>, StoreError> {
        let output = self.run(
            "list",
            format!(
                "find {} -mindepth 1 -maxdepth 1 -type d",
                quote(directory)
            ),
        )?;

        let names = output
            .stdout
            .lines()
            .filter_map(|line| line.rsplit('/').next())
            .filter(|name| pattern.is_match(name))
            .map(str::to_string)
            .collect();

        Ok(names)
    }

    fn exists(&self, path: &Path) -> Result<bool, StoreError> {
        let path = quote(path);
        self.test("check", format!("test -e {path} || test -L {path}"))
    }

    fn is_directory(&self, path: &Path) -> Result<bool, StoreError> {
        self.test("check", format!("test -d {}", quote(path)))
    }

    fn read_link(&self, path: &Path) -> Result<String, StoreError> {
        let output = self.run("read link", format!("readlink -- {}", quote(path)))?;

        Ok(output.stdout.trim_end_matches('\n').to_string())
    }

    fn rename(&self, source: &Path, destination: &Path) -> Result<(), StoreError> {
        self.run(
            "rename",
            format!("mv -- {} {}", quote(source), quote(destination)),
        )?;

        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), StoreError> {
        self.run("remove", format!("rm -rf -- {}", quote(path)))?;

        Ok(())
    }

    fn create_link(&self, target_name: &str, link_path: &Path) -> Result<(), StoreError> {
        self.run(
            "create link",
            format!(
                "ln -s -- {} {}",
                quote(Path::new(target_name)),
                quote(link_path)
            ),
        )?;

        Ok(())
    }

    fn resolve_absolute(&self, path: &Path) -> Result<String, StoreError> {
        let output = self.run("resolve", format!("cd -- {} && pwd -P", quote(path)))?;

        Ok(output.stdout.trim_end_matches('\n').to_string())
    }

    fn touch(&self, path: &Path) -> Result<(), StoreError> {
        self.run("create", format!("touch -- {}", quote(path)))?;

        Ok(())
    }
}

/// Single quotes a path for a POSIX shell.
fn quote(path: &Path) -> String {
    let path = path.to_string_lossy();
    format!("'{}'", path.replace('\'', r"'\''"))
}
