//! Reaching a remote backup destination over ssh.
//!

use std::{path::PathBuf, process::Command};

use backup_engine::{CommandOutput, Transport, TransportError};

use crate::{config::SshConfig, location::RemoteLocation};

/// The exit status ssh uses for its own failures.
const SSH_FAILURE_STATUS: i32 = 255;

/// Runs commands on a remote host with ssh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTransport {
    /// The ssh program.
    pub program: String,

    /// The user to log in as.
    pub user: String,

    /// The host to connect to.
    pub host: String,

    /// The port, the ssh default if unset.
    pub port: Option<u16>,

    /// The private key to authenticate with.
    pub identity_file: Option<PathBuf>,
}

impl SshTransport {
    /// Creates a transport to the host of `remote`.
    pub fn new(remote: &RemoteLocation, config: &SshConfig) -> Self {
        Self {
            program: config.program.clone(),
            user: remote.user.clone(),
            host: remote.host.clone(),
            port: remote.port,
            identity_file: config.identity_file.clone(),
        }
    }

    /// The arguments to run `command` on the host.
    pub fn args(&self, command: &str) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }

        if let Some(identity_file) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity_file.display().to_string());
        }

        args.push(format!("{}@{}", self.user, self.host));
        args.push(command.to_string());

        args
    }

    /// The remote shell for the transfer program to reach the host with.
    ///
    /// The identity file is single quoted, [`Config::validate`](crate::Config::validate)
    /// rejects identity files containing a quote.
    pub fn remote_shell(&self) -> String {
        let mut shell = format!("{} -p {}", self.program, self.port.unwrap_or(22));

        if let Some(identity_file) = &self.identity_file {
            shell.push_str(&format!(" -i '{}'", identity_file.display()));
        }

        shell
    }
}

impl Transport for SshTransport {
    fn execute(&self, command: &str) -> Result<CommandOutput, TransportError> {
        let output = Command::new(&self.program)
            .args(self.args(command))
            .output()
            .map_err(TransportError::Spawn)?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.code() == Some(SSH_FAILURE_STATUS) {
            return Err(TransportError::Connection(stderr));
        }

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr,
        })
    }
}
