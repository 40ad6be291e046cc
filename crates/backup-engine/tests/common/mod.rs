//! # common
//!

#![allow(dead_code)]

use core::cell::RefCell;
use std::process::Command;

use backup_engine::{CommandOutput, Transport, TransportError};
use chrono::{NaiveDate, NaiveDateTime};
use shared::SnapshotName;

/// Runs every command with `sh -c` on this machine, as if it was the remote host.
#[derive(Default)]
pub struct ShellTransport {
    pub commands: RefCell<Vec<String>>,
}

impl Transport for ShellTransport {
    fn execute(&self, command: &str) -> Result<CommandOutput, TransportError> {
        self.commands.borrow_mut().push(command.to_string());

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .map_err(TransportError::Spawn)?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// A host that can never be reached.
pub struct UnreachableTransport;

impl Transport for UnreachableTransport {
    fn execute(&self, _command: &str) -> Result<CommandOutput, TransportError> {
        Err(TransportError::Connection(
            "ssh: connect to host backup port 22: Connection refused".to_string(),
        ))
    }
}

pub fn name(raw: &str) -> SnapshotName {
    raw.parse().unwrap()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}
