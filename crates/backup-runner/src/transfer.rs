//! Copying the source into a snapshot.
//!

use std::{
    fs, io,
    path::PathBuf,
    process::{Command, ExitStatus},
};

use thiserror::Error;
use tracing::debug;

use crate::config::TransferConfig;

/// The flags rsync is run with unless the config replaces them.
pub const DEFAULT_FLAGS: &[&str] = &[
    "-D",
    "--compress",
    "--numeric-ids",
    "--links",
    "--hard-links",
    "--one-file-system",
    "--itemize-changes",
    "--times",
    "--recursive",
    "--perms",
    "--owner",
    "--group",
    "--stats",
    "--human-readable",
];

/// A single transfer into a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// The source, in transfer form.
    pub source: String,

    /// The snapshot being written, in transfer form.
    pub destination: String,

    /// The absolute path of the snapshot to hard link unchanged files against.
    pub link_base: Option<String>,

    /// A file of patterns to skip.
    pub exclude_from: Option<PathBuf>,

    /// Where the transfer writes its log.
    pub log_file: PathBuf,

    /// The shell to reach a remote side with.
    pub remote_shell: Option<String>,
}

/// How a transfer went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Everything was copied.
    Clean,

    /// Some files could not be copied.
    Warning,

    /// The transfer failed.
    Error,

    /// The destination ran out of space.
    OutOfSpace,
}

impl TransferStatus {
    /// Classifies a transfer from its log and exit status.
    pub fn classify(log: &str, exit_code: Option<i32>) -> Self {
        if log.contains("No space left on device (28)") || log.contains("Result too large (34)") {
            Self::OutOfSpace
        } else if log.contains("rsync error:") || exit_code != Some(0) {
            Self::Error
        } else if log.contains("rsync:") {
            Self::Warning
        } else {
            Self::Clean
        }
    }
}

/// The outcome of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// How the transfer went.
    pub status: TransferStatus,

    /// The transfer's exit status, `None` if it was killed by a signal.
    pub exit_code: Option<i32>,

    /// The warning and error lines from the log.
    pub messages: Vec<String>,
}

impl TransferReport {
    /// Builds a report from the log and exit status of a transfer.
    pub fn from_log(log: &str, exit_code: Option<i32>) -> Self {
        let messages = log
            .lines()
            .filter(|line| line.contains("rsync:") || line.contains("rsync error:"))
            .map(str::to_string)
            .collect();

        Self {
            status: TransferStatus::classify(log, exit_code),
            exit_code,
            messages,
        }
    }
}

/// Something that can copy a source into a snapshot.
pub trait Transfer {
    /// Runs the transfer to completion.
    fn run(&self, request: &TransferRequest) -> Result<TransferReport, TransferError>;
}

/// Transfers with rsync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsync {
    /// The rsync program.
    pub program: String,

    /// The flags before the per transfer arguments.
    pub flags: Vec<String>,
}

impl Rsync {
    /// Creates an rsync transfer from the config.
    pub fn from_config(config: &TransferConfig) -> Self {
        let mut flags = match &config.flags {
            Some(flags) => flags.clone(),
            None => DEFAULT_FLAGS.iter().map(|flag| flag.to_string()).collect(),
        };
        flags.extend(config.append_flags.iter().cloned());

        Self {
            program: config.program.clone(),
            flags,
        }
    }

    /// The arguments for a transfer.
    pub fn args(&self, request: &TransferRequest) -> Vec<String> {
        let mut args = self.flags.clone();

        if let Some(remote_shell) = &request.remote_shell {
            args.push("-e".to_string());
            args.push(remote_shell.clone());
        }

        args.push(format!("--log-file={}", request.log_file.display()));

        if let Some(exclude_from) = &request.exclude_from {
            args.push(format!("--exclude-from={}", exclude_from.display()));
        }

        if let Some(link_base) = &request.link_base {
            args.push(format!("--link-dest={link_base}"));
        }

        args.push(with_trailing_slash(&request.source));
        args.push(with_trailing_slash(&request.destination));

        args
    }
}

impl Transfer for Rsync {
    fn run(&self, request: &TransferRequest) -> Result<TransferReport, TransferError> {
        if let Some(log_dir) = request.log_file.parent() {
            fs::create_dir_all(log_dir).map_err(|e| {
                TransferError::Io(e, "create log directory", log_dir.to_path_buf())
            })?;
        }

        // rsync appends to an existing log, only what this run adds is classified.
        let offset = match fs::metadata(&request.log_file) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(TransferError::Io(e, "read log", request.log_file.clone())),
        };

        let args = self.args(request);
        debug!("Running {} {}", self.program, args.join(" "));

        let status: ExitStatus = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(TransferError::Spawn)?;

        let log = match fs::read(&request.log_file) {
            Ok(log) => log,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(TransferError::Io(e, "read log", request.log_file.clone())),
        };
        let appended = usize::try_from(offset)
            .ok()
            .and_then(|offset| log.get(offset..))
            .unwrap_or_default();

        Ok(TransferReport::from_log(
            &String::from_utf8_lossy(appended),
            status.code(),
        ))
    }
}

/// Transfers copy the contents of a directory rather than the directory itself.
fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Failed to start the transfer:\n{0}")]
    Spawn(#[source] io::Error),

    #[error("Failed to {1} {2:?}:\n{0}")]
    Io(#[source] io::Error, &'static str, PathBuf),
}
