//! # layout
//! The well known entries at the root of a backup destination.
//!

/// Marks a directory as a backup destination. Nothing destructive happens to a
/// destination without it.
pub const MARKER_FILE: &str = "backup.marker";

/// Present while a transfer into the destination has not completed.
pub const IN_PROGRESS_FILE: &str = "backup.inprogress";

/// Symbolic link to the last completed snapshot.
pub const LATEST_LINK: &str = "latest";
