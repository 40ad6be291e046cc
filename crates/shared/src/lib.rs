//! # Shared
//! The shared components between the snapshot engine and the backup runner.
//!

#![warn(missing_docs)]

mod context;
pub mod layout;
mod logger;
mod snapshot_name;

pub use context::Context;
pub use logger::{LOG_FILE_PREFIX, LoggerError, init_logger};
pub use snapshot_name::{SnapshotName, SnapshotNameError};
