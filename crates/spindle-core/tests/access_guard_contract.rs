//! Architectural Contract Test: Access Guard
//!
//! This test verifies that authorization happens before any other work.
//!
//! Constraints verified:
//! - A rejected caller causes zero browser, token, catalog and store calls
//! - Non-admin callers are rejected as forbidden
//! - Artist search accepts any authenticated caller
//!
//! If this test fails, unauthorized callers can trigger side effects.

mod common;

use common::*;
use spindle_core::{BatchStage, Error, IngestEvent};

fn assert_untouched(rig: &Rig) {
    assert_eq!(rig.browser.open_count(), 0, "browser launched");
    assert_eq!(rig.issuer.issue_count(), 0, "token requested");
    assert_eq!(rig.catalog.fetch_count(), 0, "catalog called");
    assert_eq!(rig.store.upsert_count(), 0, "store written");
}

#[tokio::test]
async fn missing_header_touches_no_collaborator() {
    let rig = Rig::new(vec![album_link("aaa")], vec![raw_album("aaa", "A", 1)]);
    let (engine, _events) = rig.engine();

    let err = engine.run_batch(None).await.unwrap_err();

    assert!(matches!(err, Error::Unauthenticated(_)));
    assert_eq!(rig.sessions.resolve_count(), 0);
    assert_untouched(&rig);
}

#[tokio::test]
async fn unknown_session_touches_no_collaborator() {
    let rig = Rig::new(vec![album_link("aaa")], vec![raw_album("aaa", "A", 1)]);
    let (engine, mut events) = rig.engine();

    let err = engine
        .run_batch(Some("Bearer stolen-token"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Unauthenticated(_)));
    assert_eq!(rig.sessions.resolve_count(), 1);
    assert_untouched(&rig);

    let events = drain_events(&mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        IngestEvent::BatchAborted {
            stage: BatchStage::Authorizing,
            ..
        }
    )));
    assert_eq!(
        events.last(),
        Some(&IngestEvent::StageChanged {
            stage: BatchStage::Fatal
        })
    );
}

#[tokio::test]
async fn member_role_is_forbidden() {
    let rig = Rig::new(vec![album_link("aaa")], vec![raw_album("aaa", "A", 1)]);
    let (engine, _events) = rig.engine();

    let err = engine.run_batch(Some(MEMBER_HEADER)).await.unwrap_err();

    assert!(matches!(err, Error::Forbidden(_)));
    assert!(err.is_authorization());
    assert_untouched(&rig);
}

#[tokio::test]
async fn artist_search_requires_session_not_admin() {
    let rig = Rig::new(Vec::new(), Vec::new());
    let (engine, _events) = rig.engine();

    let artists = engine
        .search_artists(Some(MEMBER_HEADER), "Slowdive", 5)
        .await
        .expect("members may search");
    assert_eq!(artists.len(), 2);
    assert_eq!(rig.issuer.issue_count(), 1);

    let err = engine
        .search_artists(None, "Slowdive", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthenticated(_)));
    assert_eq!(rig.catalog.search_count(), 1);
    assert_eq!(rig.issuer.issue_count(), 1);
}
