//! Tests for the `latest` link
//!

#![allow(missing_docs)]

use backup_engine::{LatestError, LocalStore, publish_latest, resolve_latest};
use common::name;
use shared::{Context, test::TestDestination};

mod common;

#[test]
fn no_link() {
    let destination = TestDestination::new();
    destination.add_snapshot("2024-01-01-000000");

    let store = LocalStore::new(destination.path());
    let latest = resolve_latest(&Context::default(), &store).unwrap();

    assert_eq!(latest, None);
}

#[test]
fn existing_target() {
    let destination = TestDestination::new();
    destination.add_snapshot("2024-01-01-000000");
    destination.set_latest("2024-01-01-000000");

    let store = LocalStore::new(destination.path());
    let latest = resolve_latest(&Context::default(), &store).unwrap();

    assert_eq!(latest, Some(destination.path().join("2024-01-01-000000")));
}

#[test]
fn missing_target_is_ignored() {
    let _logger = shared::test::init_test_logger();
    let destination = TestDestination::new();
    destination.add_snapshot("2024-01-01-000000");
    destination.set_latest("2023-01-01-000000");

    let store = LocalStore::new(destination.path());
    let latest = resolve_latest(&Context::default(), &store).unwrap();

    assert_eq!(latest, None);
}

#[test]
fn traversal_is_rejected() {
    let destination = TestDestination::new();
    destination.add_snapshot("2024-01-01-000000");

    let store = LocalStore::new(destination.path());

    for target in ["../2024-01-01-000000", "./2024-01-01-000000", ".hidden", "/etc"] {
        destination.set_latest(target);

        let result = resolve_latest(&Context::default(), &store);
        assert!(
            matches!(result, Err(LatestError::Integrity(ref raw)) if raw == target),
            "{target}: {result:?}"
        );
    }
}

#[test]
fn publish_replaces_link() {
    let destination = TestDestination::new();
    destination.add_snapshot("2024-01-01-000000");
    destination.add_snapshot("2024-01-02-000000");
    destination.set_latest("2024-01-01-000000");

    let store = LocalStore::new(destination.path());
    publish_latest(&Context::default(), &store, &name("2024-01-02-000000")).unwrap();

    assert_eq!(destination.latest().as_deref(), Some("2024-01-02-000000"));
}

#[test]
fn publish_without_previous_link() {
    let destination = TestDestination::new();
    destination.add_snapshot("2024-01-01-000000");

    let store = LocalStore::new(destination.path());
    publish_latest(&Context::default(), &store, &name("2024-01-01-000000")).unwrap();

    assert_eq!(destination.latest().as_deref(), Some("2024-01-01-000000"));
    assert_eq!(
        resolve_latest(&Context::default(), &store).unwrap(),
        Some(destination.path().join("2024-01-01-000000"))
    );
}
