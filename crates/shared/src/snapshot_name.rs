use core::{fmt, str::FromStr};
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use thiserror::Error;

/// The `chrono` format of a snapshot name.
const FORMAT: &str = "%Y-%m-%d-%H%M%S";

static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}-[0-9]{6}$").expect("Snapshot pattern must compile")
});

/// The name of a snapshot directory, `YYYY-MM-DD-HHMMSS`.
///
/// Names order lexicographically, which is also their chronological order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotName(String);

impl SnapshotName {
    /// The pattern every snapshot directory name must match.
    pub fn pattern() -> &'static Regex {
        &PATTERN
    }

    /// Creates the name of a snapshot taken at `timestamp`.
    pub fn from_timestamp(timestamp: NaiveDateTime) -> Self {
        Self(timestamp.format(FORMAT).to_string())
    }

    /// The instant this name represents.
    ///
    /// `None` if the name has the right shape but is not a real date, e.g. month 13.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, FORMAT).ok()
    }

    /// The calendar date, `YYYY-MM-DD`.
    pub fn day(&self) -> &str {
        self.0.get(..10).unwrap_or(&self.0)
    }

    /// The calendar month, `YYYY-MM`.
    pub fn month(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SnapshotName {
    type Err = SnapshotNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !PATTERN.is_match(s) {
            return Err(SnapshotNameError::Pattern(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<&str> for SnapshotName {
    type Error = SnapshotNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl AsRef<str> for SnapshotName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotNameError {
    #[error("'{0}' is not a snapshot name, expected YYYY-MM-DD-HHMMSS")]
    Pattern(String),
}
