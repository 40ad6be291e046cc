//! Tests for parsing locations
//!

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use backup_runner::{Location, LocationError, RemoteLocation};

fn remote(user: &str, host: &str, port: Option<u16>, path: &str) -> Location {
    Location::Remote(RemoteLocation {
        user: user.to_string(),
        host: host.to_string(),
        port,
        path: PathBuf::from(path),
    })
}

#[test]
fn local() {
    let location: Location = "/mnt/backups".parse().unwrap();

    assert_eq!(location, Location::Local(PathBuf::from("/mnt/backups")));
    assert!(!location.is_remote());
    assert_eq!(location.path(), Path::new("/mnt/backups"));
}

#[test]
fn local_with_at_and_colon() {
    let location: Location = "/mnt/user@host:backups".parse().unwrap();

    assert_eq!(
        location,
        Location::Local(PathBuf::from("/mnt/user@host:backups"))
    );
}

#[test]
fn remote_without_port() {
    let location: Location = "backup@nas.local:/volume1/backups".parse().unwrap();

    assert_eq!(
        location,
        remote("backup", "nas.local", None, "/volume1/backups")
    );
    assert!(location.is_remote());
}

#[test]
fn remote_with_port() {
    let location: Location = "backup@10.0.0.2:2222:/backups".parse().unwrap();

    assert_eq!(location, remote("backup", "10.0.0.2", Some(2222), "/backups"));
    assert_eq!(location.to_string(), "backup@10.0.0.2:2222:/backups");
}

#[test]
fn invalid_port() {
    for raw in ["backup@nas:99999:/backups", "backup@nas:0:/backups"] {
        let result = raw.parse::<Location>();
        assert_eq!(result, Err(LocationError::InvalidPort(raw.to_string())));
    }
}

#[test]
fn empty_path() {
    for raw in ["", "backup@nas:", "backup@nas:22:"] {
        let result = raw.parse::<Location>();
        assert_eq!(result, Err(LocationError::EmptyPath(raw.to_string())));
    }
}

#[test]
fn disallowed_characters() {
    let result = "/mnt/it's".parse::<Location>();
    assert!(matches!(
        result,
        Err(LocationError::DisallowedCharacter { character: '\'', .. })
    ));

    let result = "backup@nas:/mnt\n/backups".parse::<Location>();
    assert!(matches!(
        result,
        Err(LocationError::DisallowedCharacter { character: '\n', .. })
    ));
}

#[test]
fn pairs() {
    let (source, destination) =
        Location::parse_pair("root@server:/srv", "/mnt/backups").unwrap();
    assert!(source.is_remote());
    assert!(!destination.is_remote());

    let result = Location::parse_pair("root@server:/srv", "backup@nas:/backups");
    assert_eq!(result, Err(LocationError::BothRemote));
}

#[test]
fn transfer_form() {
    let location = remote("backup", "nas", Some(2222), "/backups");
    assert_eq!(
        location.transfer_form(Path::new("/backups/2024-06-01-120000")),
        "backup@nas:/backups/2024-06-01-120000"
    );

    let location = Location::Local(PathBuf::from("/mnt/backups"));
    assert_eq!(
        location.transfer_form(Path::new("/mnt/backups/2024-06-01-120000")),
        "/mnt/backups/2024-06-01-120000"
    );
}
