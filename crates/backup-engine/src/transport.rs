//! Running commands on the host holding a remote destination.
//!

use std::io;

use thiserror::Error;

/// Executes a single shell command on a remote host.
pub trait Transport {
    /// Runs `command` and waits for it to exit.
    ///
    /// A command that ran but exited unsuccessfully is an `Ok`, only failing to
    /// reach the host is an error.
    fn execute(&self, command: &str) -> Result<CommandOutput, TransportError>;
}

/// The result of a command run through a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// The exit status, `None` if the command was killed by a signal.
    pub status: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// If the command exited with status 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to start the transport:\n{0}")]
    Spawn(#[source] io::Error),

    #[error("Could not reach the remote host:\n{0}")]
    Connection(String),
}
