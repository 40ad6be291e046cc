//! # backup-runner
//! Takes one incremental snapshot per invocation, run it from cron or a timer.
//!

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::{
    fs,
    path::PathBuf,
    process::{self, ExitCode},
    thread,
};

use backup_engine::{LocalStore, RemoteStore, SnapshotStore};
use backup_runner::{
    BackupRunner, Config, Location, LockGuard, LoggingConfig, Rsync, SshTransport, TransferStatus,
    lock,
};
use mimalloc::MiMalloc;
use shared::init_logger;
use signal_hook::{
    consts::signal::{SIGINT, SIGTERM},
    iterator::Signals,
};
use tracing::{Level, error, info, warn};

/// The exit status after being interrupted.
const INTERRUPTED: i32 = 130;

fn main() -> ExitCode {
    // Initialize config if args include 'init'.
    if std::env::args().any(|arg| arg.eq("init")) {
        let contents = match toml::to_string_pretty(&Config::default()) {
            Ok(contents) => contents,
            Err(error) => {
                eprintln!("Could not serialize config: {error}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(error) = fs::write("config.toml", contents) {
            eprintln!("Could not create config.toml: {error}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    // Load config, the logger needs its settings.
    let config = Config::load_toml(PathBuf::from("./config.toml"));
    let (log_dir, logging) = match &config {
        Ok(config) => (config.log_dir.clone(), config.logging.clone()),
        Err(_) => (Config::default().log_dir, LoggingConfig::default()),
    };
    let level = logging.level().unwrap_or(Level::INFO);

    let _logger = match init_logger(&log_dir, level, logging.retained_files) {
        Ok(logger) => logger,
        Err(error) => {
            eprintln!("Could not initialize logger: {error}");
            return ExitCode::FAILURE;
        }
    };

    let config = match config {
        Ok(config) => config,
        Err(error) => {
            error!("Could not load config: {error}");
            return ExitCode::FAILURE;
        }
    };

    let (source, destination) = match Location::parse_pair(&config.source, &config.destination) {
        Ok(locations) => locations,
        Err(error) => {
            error!("Invalid config: {error}");
            return ExitCode::FAILURE;
        }
    };

    let lock_guard = match LockGuard::acquire(&config.lock_file) {
        Ok(lock_guard) => lock_guard,
        Err(error) => {
            error!("Could not take the lock: {error}");
            return ExitCode::FAILURE;
        }
    };

    // Release the lock when interrupted, the next run resumes the backup.
    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(signals) => signals,
        Err(error) => {
            error!("Could not register signal handlers: {error}");
            return ExitCode::FAILURE;
        }
    };
    let lock_file = lock_guard.path().to_path_buf();
    thread::spawn(move || {
        if signals.forever().next().is_some() {
            warn!("Interrupted - the next run will resume this backup.");
            lock::release(&lock_file);
            process::exit(INTERRUPTED);
        }
    });

    let transfer = Rsync::from_config(&config.transfer);

    match destination.clone() {
        Location::Local(path) => {
            let store = LocalStore::new(path);
            run(BackupRunner::new(config, source, destination, store, transfer))
        }
        Location::Remote(remote) => {
            let transport = SshTransport::new(&remote, &config.ssh);
            let store = RemoteStore::new(remote.path, transport);
            run(BackupRunner::new(config, source, destination, store, transfer))
        }
    }
}

fn run<S: SnapshotStore>(runner: BackupRunner<S, Rsync>) -> ExitCode {
    match runner.run() {
        Ok(outcome) if outcome.status == TransferStatus::Error => ExitCode::FAILURE,
        Ok(outcome) => {
            info!("Backup {} finished.", outcome.snapshot);
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("Backup failed: {error}");
            ExitCode::FAILURE
        }
    }
}
