//! Tests for the ssh transport
//!

#![allow(missing_docs)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use backup_engine::{Transport, TransportError};
use backup_runner::{RemoteLocation, SshConfig, SshTransport};
use tempfile::TempDir;

/// Runs the command locally, as the remote host would.
const FAKE_SSH: &str = "#!/bin/sh\nshift $(($# - 1))\nexec sh -c \"$1\"\n";

fn fake_ssh(directory: &Path) -> SshTransport {
    let program = directory.join("fake-ssh");
    fs::write(&program, FAKE_SSH).unwrap();
    fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();

    let config = SshConfig {
        program: program.display().to_string(),
        identity_file: Some(directory.join("id_backup")),
    };
    SshTransport::new(&remote(Some(2222)), &config)
}

fn remote(port: Option<u16>) -> RemoteLocation {
    RemoteLocation {
        user: "backup".to_string(),
        host: "nas.local".to_string(),
        port,
        path: PathBuf::from("/backups"),
    }
}

#[test]
fn args() {
    let transport = SshTransport::new(&remote(None), &SshConfig::default());

    assert_eq!(transport.program, "ssh");
    assert_eq!(
        transport.args("test -d '/backups'"),
        ["backup@nas.local", "test -d '/backups'"]
    );
}

#[test]
fn args_with_port_and_identity() {
    let config = SshConfig {
        identity_file: Some(PathBuf::from("/root/.ssh/backup")),
        ..SshConfig::default()
    };
    let transport = SshTransport::new(&remote(Some(2222)), &config);

    assert_eq!(
        transport.args("pwd"),
        [
            "-p",
            "2222",
            "-i",
            "/root/.ssh/backup",
            "backup@nas.local",
            "pwd"
        ]
    );
}

#[test]
fn remote_shell() {
    let transport = SshTransport::new(&remote(None), &SshConfig::default());
    assert_eq!(transport.remote_shell(), "ssh -p 22");

    let config = SshConfig {
        identity_file: Some(PathBuf::from("/root/.ssh/backup")),
        ..SshConfig::default()
    };
    let transport = SshTransport::new(&remote(Some(2222)), &config);
    assert_eq!(transport.remote_shell(), "ssh -p 2222 -i '/root/.ssh/backup'");
}

#[test]
fn execute() {
    let directory = TempDir::new().unwrap();
    let transport = fake_ssh(directory.path());

    let output = transport.execute("echo found; exit 1").unwrap();
    assert_eq!(output.status, Some(1));
    assert_eq!(output.stdout, "found\n");
    assert!(!output.success());

    // 255 is ssh itself failing.
    let result = transport.execute(
        "echo 'ssh: connect to host nas.local port 2222: Connection refused' >&2; exit 255",
    );
    assert!(matches!(
        result,
        Err(TransportError::Connection(ref stderr)) if stderr.contains("Connection refused")
    ));

    let transport = SshTransport {
        program: directory.path().join("no-ssh").display().to_string(),
        ..transport
    };
    assert!(matches!(
        transport.execute("true"),
        Err(TransportError::Spawn(_))
    ));
}
