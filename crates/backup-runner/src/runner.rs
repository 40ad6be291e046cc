//! Running a single backup from start to finish.
//!

use std::{fs, path::PathBuf};

use backup_engine::{
    ExpireError, LatestError, ResolveError, SafetyCheckError, SnapshotStore, SpaceRecovery,
    StoreError, ensure_backup_destination, on_space_exhausted, prune, publish_latest,
    resolve_directories,
};
use chrono::{Local, NaiveDateTime};
use shared::{Context, SnapshotName, layout::IN_PROGRESS_FILE};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    location::Location,
    ssh::SshTransport,
    transfer::{Transfer, TransferError, TransferReport, TransferRequest, TransferStatus},
};

/// The result of a run that got as far as finishing its transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The snapshot that was written.
    pub snapshot: SnapshotName,

    /// How the transfer went.
    pub status: TransferStatus,

    /// If an interrupted snapshot was completed.
    pub resumed: bool,

    /// The transfer's log file, if it was kept.
    pub log_file: Option<PathBuf>,
}

/// Backs up a source into the snapshots at a destination.
pub struct BackupRunner<S, X> {
    config: Config,
    source: Location,
    destination: Location,
    store: S,
    transfer: X,
}

impl<S: SnapshotStore, X: Transfer> BackupRunner<S, X> {
    /// Creates a runner, `store` must be rooted at `destination`.
    pub fn new(
        config: Config,
        source: Location,
        destination: Location,
        store: S,
        transfer: X,
    ) -> Self {
        Self {
            config,
            source,
            destination,
            store,
            transfer,
        }
    }

    /// The store snapshots are kept in.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The transfer snapshots are written with.
    pub fn transfer(&self) -> &X {
        &self.transfer
    }

    /// Takes a snapshot named after the current local time.
    pub fn run(&self) -> Result<RunOutcome, RunError> {
        self.run_at(Local::now().naive_local())
    }

    /// Takes a snapshot named after `now`.
    pub fn run_at(&self, now: NaiveDateTime) -> Result<RunOutcome, RunError> {
        let mut context = Context::for_destination(self.destination.to_string());
        let root = self.store.root().to_path_buf();

        ensure_backup_destination(&self.store, &root)?;

        let name = SnapshotName::from_timestamp(now);
        let resolution = resolve_directories(&mut context, &self.store, &name)?;

        let in_progress = root.join(IN_PROGRESS_FILE);
        let log_file = self.config.log_dir.join(format!("{name}.log"));

        let report = loop {
            if self.config.auto_expire {
                prune(&mut context, &self.store, now)?;
            }

            context.current_context = "Transfer";
            self.store.touch(&in_progress)?;

            let request = TransferRequest {
                source: self.source.transfer_form(self.source.path()),
                destination: self.destination.transfer_form(&resolution.dest),
                link_base: self.link_base(&context, resolution.link_base.as_ref())?,
                exclude_from: self.config.exclude_from.clone(),
                log_file: log_file.clone(),
                remote_shell: self.remote_shell(),
            };

            info!(
                "{context}Starting backup from {} to {}",
                request.source, request.destination
            );
            let report = self.transfer.run(&request)?;

            if report.status != TransferStatus::OutOfSpace {
                break report;
            }

            match on_space_exhausted(&mut context, &self.store)? {
                SpaceRecovery::Retry { .. } => continue,
                SpaceRecovery::Exhausted => return Err(RunError::OutOfSpace),
            }
        };

        context.current_context = "Finalize";
        let log_file = self.log_report(&context, &report, log_file);

        if report.status == TransferStatus::Error {
            error!("{context}Backup failed, {name} was not made the latest backup.");
        } else {
            publish_latest(&context, &self.store, &name)?;
        }

        self.store.remove(&in_progress)?;

        Ok(RunOutcome {
            snapshot: name,
            status: report.status,
            resumed: resolution.resumed,
            log_file,
        })
    }

    /// The absolute path of the link base on the destination host.
    ///
    /// Running out of space may have expired it since it was resolved.
    fn link_base(
        &self,
        context: &Context,
        link_base: Option<&PathBuf>,
    ) -> Result<Option<String>, StoreError> {
        let Some(link_base) = link_base else {
            return Ok(None);
        };

        if !self.store.is_directory(link_base)? {
            warn!("{context}Link base {link_base:?} no longer exists - doing a full backup.");
            return Ok(None);
        }

        Ok(Some(self.store.resolve_absolute(link_base)?))
    }

    /// The shell the transfer reaches the remote side with, if either side is remote.
    fn remote_shell(&self) -> Option<String> {
        [&self.source, &self.destination]
            .into_iter()
            .find_map(|location| match location {
                Location::Remote(remote) => {
                    Some(SshTransport::new(remote, &self.config.ssh).remote_shell())
                }
                Location::Local(_) => None,
            })
    }

    /// Logs how the transfer went, returns the log file if it was kept.
    fn log_report(
        &self,
        context: &Context,
        report: &TransferReport,
        log_file: PathBuf,
    ) -> Option<PathBuf> {
        match report.status {
            TransferStatus::Clean => {
                info!("{context}Backup completed without errors.");

                if self.config.transfer.auto_delete_log {
                    if let Err(e) = fs::remove_file(&log_file) {
                        warn!("{context}Could not remove transfer log {log_file:?}: {e}");
                    }
                    return None;
                }
            }

            TransferStatus::Warning => {
                for message in &report.messages {
                    warn!("{context}{message}");
                }
                warn!("{context}Backup completed with warnings, see {log_file:?}");
            }

            TransferStatus::Error | TransferStatus::OutOfSpace => {
                for message in &report.messages {
                    error!("{context}{message}");
                }
                error!(
                    "{context}Transfer exited with {:?}, see {log_file:?}",
                    report.exit_code
                );
            }
        }

        Some(log_file)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Safety(#[from] SafetyCheckError),

    #[error("Failed to resolve the backup directories:\n{0}")]
    Resolve(#[from] ResolveError),

    #[error("Failed to expire old backups:\n{0}")]
    Expire(#[from] ExpireError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Transfer(#[from] TransferError),

    #[error("Failed to update the latest backup:\n{0}")]
    Latest(#[from] LatestError),

    #[error("No space left on device, and no old backup to delete.")]
    OutOfSpace,
}
