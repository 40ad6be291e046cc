//! # common
//!

#![allow(dead_code)]

use core::cell::RefCell;
use std::{
    collections::VecDeque,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use backup_engine::LocalStore;
use backup_runner::{
    BackupRunner, Config, Location, Rsync, Transfer, TransferError, TransferReport, TransferRequest,
    TransferStatus,
};
use chrono::{NaiveDate, NaiveDateTime};
use shared::test::TestDestination;
use tempfile::TempDir;

/// Writes a snapshot and a log for each status it was given, in order.
///
/// Every transfer after the scripted ones is clean.
pub struct ScriptedTransfer {
    statuses: RefCell<VecDeque<TransferStatus>>,
    pub requests: RefCell<Vec<TransferRequest>>,
}

impl ScriptedTransfer {
    pub fn new(statuses: impl IntoIterator<Item = TransferStatus>) -> Self {
        Self {
            statuses: RefCell::new(statuses.into_iter().collect()),
            requests: RefCell::default(),
        }
    }

    pub fn requests(&self) -> Vec<TransferRequest> {
        self.requests.borrow().clone()
    }
}

impl Transfer for ScriptedTransfer {
    fn run(&self, request: &TransferRequest) -> Result<TransferReport, TransferError> {
        self.requests.borrow_mut().push(request.clone());

        let status = self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(TransferStatus::Clean);

        let destination = PathBuf::from(&request.destination);
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("copied.txt"), "copied").unwrap();

        let (log, exit_code) = match status {
            TransferStatus::Clean => ("", 0),
            TransferStatus::Warning => (
                "rsync: [sender] send_files failed to open \"/srv/data/secret\": Permission denied (13)\n",
                0,
            ),
            TransferStatus::Error => (
                "rsync error: some files/attrs were not transferred (see previous errors) (code 23)\n",
                23,
            ),
            TransferStatus::OutOfSpace => (
                "rsync: [receiver] write failed on \"/backups/file\": No space left on device (28)\n",
                11,
            ),
        };
        // rsync appends to the log of an earlier attempt.
        let mut log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&request.log_file)
            .unwrap();
        log_file.write_all(log.as_bytes()).unwrap();

        Ok(TransferReport::from_log(log, Some(exit_code)))
    }
}

/// A local runner backing up `/srv/data` into `destination`.
pub struct TestRunner {
    pub runner: BackupRunner<LocalStore, ScriptedTransfer>,
    pub logs: TempDir,
}

impl TestRunner {
    pub fn new(destination: &TestDestination, statuses: &[TransferStatus]) -> Self {
        Self::with_config(destination, statuses, |_| {})
    }

    pub fn with_config(
        destination: &TestDestination,
        statuses: &[TransferStatus],
        configure: impl FnOnce(&mut Config),
    ) -> Self {
        let logs = TempDir::new().unwrap();

        let mut config = Config {
            source: "/srv/data".to_string(),
            destination: destination.path().display().to_string(),
            log_dir: logs.path().to_path_buf(),
            lock_file: logs.path().join("backup-runner.lock"),
            auto_expire: false,
            ..Config::default()
        };
        configure(&mut config);

        let (source, target) = Location::parse_pair(&config.source, &config.destination).unwrap();
        let store = LocalStore::new(destination.path());
        let transfer = ScriptedTransfer::new(statuses.iter().copied());

        Self {
            runner: BackupRunner::new(config, source, target, store, transfer),
            logs,
        }
    }

    pub fn requests(&self) -> Vec<TransferRequest> {
        self.runner.transfer().requests()
    }

    pub fn log_file(&self, name: &str) -> PathBuf {
        self.logs.path().join(format!("{name}.log"))
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

/// The absolute path the store reports for `path`.
pub fn absolute(path: PathBuf) -> String {
    fs::canonicalize(path).unwrap().display().to_string()
}

/// Stands in for rsync, run through `sh` so the script itself is never executed.
///
/// The first run reports the destination full, every later run succeeds. Each run
/// appends to the log and creates the destination.
const FAKE_RSYNC: &str = r#"
count_file="$(dirname "$0")/runs"
runs=$(cat "$count_file" 2>/dev/null || echo 0)
runs=$((runs + 1))
echo "$runs" > "$count_file"

for arg in "$@"; do
    case "$arg" in
        --log-file=*) log="${arg#--log-file=}" ;;
    esac
    destination="$arg"
done
mkdir -p "$destination"

if [ "$runs" -eq 1 ]; then
    echo "rsync: [receiver] write failed on \"$destination/file\": No space left on device (28)" >> "$log"
    exit 11
fi

echo "sent 10 bytes  received 20 bytes  30.00 bytes/sec" >> "$log"
exit 0
"#;

/// An rsync transfer whose first run fails for lack of space.
pub fn fake_rsync(directory: &Path) -> Rsync {
    let script = directory.join("fake-rsync.sh");
    fs::write(&script, FAKE_RSYNC).unwrap();

    Rsync {
        program: "sh".to_string(),
        flags: vec![script.display().to_string()],
    }
}

/// How many times the fake rsync in `directory` ran.
pub fn fake_rsync_runs(directory: &Path) -> usize {
    fs::read_to_string(directory.join("runs"))
        .map(|runs| runs.trim().parse().unwrap())
        .unwrap_or(0)
}
