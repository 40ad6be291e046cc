#![allow(missing_docs)]

use shared::Context;

#[test]
fn empty_context() {
    assert_eq!(Context::default().to_string(), "");
}

#[test]
fn destination_and_stage() {
    let mut context = Context::for_destination("/mnt/backups");
    assert_eq!(context.to_string(), "[/mnt/backups] ");

    context.current_context = "Prune";
    assert_eq!(context.to_string(), "[/mnt/backups] [Prune] ");
}
