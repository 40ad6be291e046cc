//! Where a backup is read from or written to.
//!

use core::{fmt, str::FromStr};
use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use thiserror::Error;

/// A location on another host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLocation {
    /// The user to log in as.
    pub user: String,

    /// The host name or address.
    pub host: String,

    /// The ssh port, the ssh default if unset.
    pub port: Option<u16>,

    /// The path on the host.
    pub path: PathBuf,
}

/// A local path, `user@host:path` or `user@host:port:path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    #[allow(missing_docs)]
    Local(PathBuf),

    #[allow(missing_docs)]
    Remote(RemoteLocation),
}

impl Location {
    /// Parses the source and destination, at most one of them may be remote.
    pub fn parse_pair(source: &str, destination: &str) -> Result<(Self, Self), LocationError> {
        let source: Self = source.parse()?;
        let destination: Self = destination.parse()?;

        if source.is_remote() && destination.is_remote() {
            return Err(LocationError::BothRemote);
        }

        Ok((source, destination))
    }

    /// The path, on whichever host it is.
    pub fn path(&self) -> &Path {
        match self {
            Self::Local(path) => path,
            Self::Remote(remote) => &remote.path,
        }
    }

    /// If the location is on another host.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// `path` on the same host as this location, as the transfer program expects it.
    pub fn transfer_form(&self, path: &Path) -> String {
        match self {
            Self::Local(_) => path.display().to_string(),
            Self::Remote(remote) => {
                format!("{}@{}:{}", remote.user, remote.host, path.display())
            }
        }
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        static REMOTE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^([A-Za-z0-9._%+-]+)@([A-Za-z0-9.-]+):(.*)$")
                .expect("Remote location pattern should be valid")
        });
        static PORT: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^([0-9]+):(.*)$").expect("Port pattern should be valid")
        });

        if let Some(character) = value.chars().find(|c| matches!(c, '\'' | '\n')) {
            return Err(LocationError::DisallowedCharacter {
                location: value.to_string(),
                character,
            });
        }

        let Some(captures) = REMOTE.captures(value) else {
            if value.is_empty() {
                return Err(LocationError::EmptyPath(value.to_string()));
            }
            return Ok(Self::Local(PathBuf::from(value)));
        };

        let (_, [user, host, rest]) = captures.extract();

        let (port, path) = match PORT.captures(rest) {
            Some(captures) => {
                let (_, [port, path]) = captures.extract();
                let port = port
                    .parse::<u16>()
                    .ok()
                    .filter(|port| *port != 0)
                    .ok_or_else(|| LocationError::InvalidPort(value.to_string()))?;
                (Some(port), path)
            }
            None => (None, rest),
        };

        if path.is_empty() {
            return Err(LocationError::EmptyPath(value.to_string()));
        }

        Ok(Self::Remote(RemoteLocation {
            user: user.to_string(),
            host: host.to_string(),
            port,
            path: PathBuf::from(path),
        }))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(remote) => {
                write!(f, "{}@{}:", remote.user, remote.host)?;
                if let Some(port) = remote.port {
                    write!(f, "{port}:")?;
                }
                write!(f, "{}", remote.path.display())
            }
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location {0:?} has no path.")]
    EmptyPath(String),

    #[error("Location {0:?} has an invalid port.")]
    InvalidPort(String),

    #[error("Location {location:?} contains {character:?}, which is not allowed.")]
    DisallowedCharacter { location: String, character: char },

    #[error("The source and destination cannot both be remote.")]
    BothRemote,
}
