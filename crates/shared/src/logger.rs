use core::num::NonZeroUsize;
use std::{
    fs::create_dir_all,
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{Level, subscriber::set_global_default};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, registry};

/// The prefix of the runner's own daily logs.
///
/// Transfer logs are named after their snapshot and share the directory.
pub const LOG_FILE_PREFIX: &str = "backup-runner";

/// Create and set the global loggers, writing daily files into `log_directory`.
///
/// Only the newest `retained_files` daily files are kept.
pub fn init_logger(
    log_directory: &Path,
    level: Level,
    retained_files: NonZeroUsize,
) -> Result<Vec<WorkerGuard>, LoggerError> {
    create_dir_all(log_directory)
        .map_err(|e| LoggerError::CreateDirectory(e, log_directory.to_path_buf()))?;

    let appender = RollingFileAppender::builder()
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .rotation(Rotation::DAILY)
        .max_log_files(retained_files.get())
        .build(log_directory)?;

    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(io::stdout());

    let registry = registry()
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(false),
        )
        .with(
            fmt::layer()
                .with_writer(stdout_writer)
                .with_ansi(true)
                .with_target(false),
        )
        .with(Targets::new().with_default(level));

    set_global_default(registry)?;

    Ok(vec![file_guard, stdout_guard])
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to create rolling appender:\n{0}")]
    CreateRollingAppender(#[from] tracing_appender::rolling::InitError),

    #[error("Failed to create log directory {1:?}:\n{0}")]
    CreateDirectory(#[source] io::Error, PathBuf),

    #[error("A global logger is already set:\n{0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}
