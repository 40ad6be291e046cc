//! # backup-engine
//! Resolving, resuming and expiring the snapshots at a backup destination.
//!

pub mod catalog;
pub mod latest;
pub mod resolver;
pub mod retention;
pub mod safety;
pub mod store;
pub mod transport;

pub use catalog::SnapshotCatalog;
pub use latest::{LatestError, publish_latest, resolve_latest};
pub use resolver::{Resolution, ResolveError, resolve_directories};
pub use retention::{
    ExpireError, SpaceRecovery, expire_snapshot, expired_snapshots, on_space_exhausted, prune,
};
pub use safety::{SafetyCheckError, ensure_backup_destination};
pub use store::{LocalStore, RemoteStore, SnapshotStore, StoreError};
pub use transport::{CommandOutput, Transport, TransportError};
