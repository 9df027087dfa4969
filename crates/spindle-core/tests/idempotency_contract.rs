//! Architectural Contract Test: Storage Idempotency
//!
//! This test verifies that releases are keyed on their canonical URL.
//!
//! Constraints verified:
//! - Re-running a batch over the same links does not grow the store
//! - A second write replaces the stored record rather than merging it
//!
//! If this test fails, repeated imports create duplicates.

mod common;

use common::*;
use spindle_core::IngestEvent;
use spindle_core::traits::{ReleaseStore, UpsertOutcome};

#[tokio::test]
async fn rerun_does_not_grow_store() {
    let hrefs = vec![album_link("aaa"), album_link("bbb")];
    let rig = Rig::new(
        hrefs,
        vec![raw_album("aaa", "A", 2), raw_album("bbb", "B", 2)],
    );
    let (engine, mut events) = rig.engine();

    let first = engine.run_batch(Some(ADMIN_HEADER)).await.unwrap();
    assert_eq!(first.imported_count, 2);
    assert_eq!(rig.store.count_releases().await.unwrap(), 2);
    drain_events(&mut events);

    let second = engine.run_batch(Some(ADMIN_HEADER)).await.unwrap();
    assert_eq!(second.imported_count, 2);
    assert_eq!(rig.store.count_releases().await.unwrap(), 2);

    let replaced = drain_events(&mut events)
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                IngestEvent::LinkImported {
                    outcome: UpsertOutcome::Replaced,
                    ..
                }
            )
        })
        .count();
    assert_eq!(replaced, 2);
}

#[tokio::test]
async fn second_write_replaces_tracks() {
    let first_rig = Rig::new(vec![album_link("aaa")], vec![raw_album("aaa", "A", 5)]);
    let (engine, _events) = first_rig.engine();
    engine.run_batch(Some(ADMIN_HEADER)).await.unwrap();

    // Same store, catalog now reports fewer tracks
    let second_rig = Rig {
        store: MockReleaseStore::sharing_counters_with(&first_rig.store),
        ..Rig::new(vec![album_link("aaa")], vec![raw_album("aaa", "A", 2)])
    };
    let (engine, _events) = second_rig.engine();
    engine.run_batch(Some(ADMIN_HEADER)).await.unwrap();

    let stored = first_rig
        .store
        .get_release(&album_link("aaa"))
        .await
        .unwrap()
        .expect("release stored");
    assert_eq!(stored.record.tracks.len(), 2);
    assert_eq!(first_rig.store.count_releases().await.unwrap(), 1);
}
