//! # backup-runner
//! Takes an incremental, hard linked snapshot of a source into a backup destination.
//!

pub mod config;
pub mod location;
pub mod lock;
pub mod runner;
pub mod ssh;
pub mod transfer;

pub use config::{Config, LoadConfigError, LoggingConfig, SshConfig, TransferConfig};
pub use location::{Location, LocationError, RemoteLocation};
pub use lock::{LockError, LockGuard};
pub use runner::{BackupRunner, RunError, RunOutcome};
pub use ssh::SshTransport;
pub use transfer::{Rsync, Transfer, TransferError, TransferReport, TransferRequest, TransferStatus};
