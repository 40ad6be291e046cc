//! Backup runner config
//!

use core::{num::NonZeroUsize, str::FromStr};
use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, metadata::ParseLevelError};

/// Characters the remote shell cannot carry inside a quoted identity file.
const IDENTITY_FILE_DISALLOWED: &[char] = &['\'', '\n'];

/// How many daily log files are kept unless configured.
const DEFAULT_RETAINED_LOG_FILES: NonZeroUsize = NonZeroUsize::new(90).unwrap();

/// How the transfer program is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// The transfer program.
    pub program: String,

    /// Replaces the default flags when set.
    pub flags: Option<Vec<String>>,

    /// Added after the flags.
    pub append_flags: Vec<String>,

    /// If the transfer log is deleted after a clean run.
    pub auto_delete_log: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            program: "rsync".to_string(),
            flags: None,
            append_flags: Vec::new(),
            auto_delete_log: true,
        }
    }
}

/// How remote hosts are reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// The ssh program.
    pub program: String,

    /// The private key to authenticate with.
    pub identity_file: Option<PathBuf>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            program: "ssh".to_string(),
            identity_file: None,
        }
    }
}

/// How the runner logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// The most verbose level logged, `error` through `trace`.
    pub level: String,

    /// How many daily log files are kept.
    pub retained_files: NonZeroUsize,
}

impl LoggingConfig {
    /// The parsed log level.
    pub fn level(&self) -> Result<Level, ParseLevelError> {
        Level::from_str(&self.level)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            retained_files: DEFAULT_RETAINED_LOG_FILES,
        }
    }
}

/// The runner's config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// What to back up, a local path or `user@host[:port]:path`.
    pub source: String,

    /// Where snapshots are kept, a local path or `user@host[:port]:path`.
    pub destination: String,

    /// A file of patterns the transfer skips.
    pub exclude_from: Option<PathBuf>,

    /// Where the runner's logs and the transfer logs are written.
    pub log_dir: PathBuf,

    /// The lock file held while a backup runs.
    pub lock_file: PathBuf,

    /// If snapshots outside the retention policy are expired before each transfer.
    pub auto_expire: bool,

    /// The transfer config.
    #[serde(default)]
    pub transfer: TransferConfig,

    /// The ssh config.
    #[serde(default)]
    pub ssh: SshConfig,

    /// The logging config.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Tries to load a config from a toml file.
    pub fn load_toml(file_path: PathBuf) -> Result<Self, LoadConfigError> {
        if !file_path.exists() {
            return Err(LoadConfigError::NoFile);
        }

        let contents = fs::read_to_string(file_path).map_err(LoadConfigError::Read)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Checks the values serde cannot.
    pub fn validate(&self) -> Result<(), LoadConfigError> {
        if let Some(identity_file) = &self.ssh.identity_file {
            let identity_file = identity_file.display().to_string();
            if let Some(character) = identity_file
                .chars()
                .find(|character| IDENTITY_FILE_DISALLOWED.contains(character))
            {
                return Err(LoadConfigError::DisallowedCharacter {
                    field: "ssh.identity_file",
                    character,
                });
            }
        }

        self.logging.level().map_err(LoadConfigError::LogLevel)?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: "/home".to_string(),
            destination: "/mnt/backups".to_string(),
            exclude_from: None,
            log_dir: PathBuf::from("logs"),
            lock_file: PathBuf::from("backup-runner.lock"),
            auto_expire: true,
            transfer: TransferConfig::default(),
            ssh: SshConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("The file does not exist.")]
    NoFile,

    #[error("Failed to read the file:\n{0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to deserialize the file:\n{0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("{field} may not contain {character:?}.")]
    DisallowedCharacter {
        field: &'static str,
        character: char,
    },

    #[error("Invalid logging.level:\n{0}")]
    LogLevel(#[source] ParseLevelError),
}
