//! Two-node replication over real HTTP.

use memoir::store::NodeStore;
use memoir::sync::protocol::BackupSnapshot;
use memoir::types::NodeRole;

use crate::helpers::{attempt, here, serve, test_node};

#[tokio::test]
async fn secondary_pushes_recent_records_to_primary() {
    let primary = test_node(NodeRole::Primary, "http://127.0.0.1:1");
    let (primary_url, server) = serve(primary.node.clone()).await;

    let secondary = test_node(NodeRole::Secondary, &primary_url);

    // Write on the secondary: a login session and a diary entry.
    let success = secondary
        .node
        .login(attempt("primary-secret", false, Some(here())))
        .unwrap();
    secondary
        .node
        .create_entry(
            &success.session_token,
            "sync me".to_string(),
            "written on the secondary".to_string(),
            Default::default(),
        )
        .unwrap();

    // The push is gated on the latest probe; before any probe nothing moves.
    secondary.node.push_now().await;
    assert!(primary.store.recent_entries(10).unwrap().is_empty());

    // After a successful probe the cycle pushes both batches.
    secondary.node.health_monitor().probe().await;
    assert!(secondary.node.health_monitor().peer_is_up());
    secondary.node.push_now().await;

    let entries = primary.store.recent_entries(10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "sync me");
    let sessions = primary.store.recent_sessions(10).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].device_id, "d1");

    // Pushing the same records again changes nothing (idempotent upsert).
    secondary.node.push_now().await;
    assert_eq!(primary.store.recent_entries(10).unwrap().len(), 1);
    assert_eq!(primary.store.recent_sessions(10).unwrap().len(), 1);

    server.abort();
}

#[tokio::test]
async fn failed_probe_is_advisory_only() {
    // Peer does not exist; probing fails, but the node still serves its own
    // clients and reports itself healthy.
    let node = test_node(NodeRole::Secondary, "http://127.0.0.1:1");
    node.node.health_monitor().probe().await;
    assert!(!node.node.health_monitor().peer_is_up());

    let success = node
        .node
        .login(attempt("primary-secret", false, Some(here())))
        .unwrap();
    assert!(!success.session_token.is_empty());
    assert!(node.node.health_status().is_ok());
}

#[tokio::test]
async fn recovery_pull_returns_bounded_snapshot() {
    let primary = test_node(NodeRole::Primary, "http://127.0.0.1:1");
    let success = primary
        .node
        .login(attempt("primary-secret", false, Some(here())))
        .unwrap();
    for i in 0..3 {
        primary.clock.advance_secs(1);
        primary
            .node
            .create_entry(
                &success.session_token,
                format!("entry {i}"),
                "text".to_string(),
                Default::default(),
            )
            .unwrap();
    }
    let (url, server) = serve(primary.node.clone()).await;

    let snapshot: BackupSnapshot = reqwest::get(format!("{url}/sync/pull"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(snapshot.diary_entries.len(), 3);
    assert_eq!(snapshot.sessions.len(), 1);
    // Newest first.
    assert_eq!(snapshot.diary_entries[0].title, "entry 2");

    server.abort();
}

#[tokio::test]
async fn recovery_pull_is_role_dependent() {
    // The Primary holds the merged copy, so only it serves the recovery
    // pull by default; on the Secondary the path does not exist.
    let primary = test_node(NodeRole::Primary, "http://127.0.0.1:1");
    let (url, server) = serve(primary.node.clone()).await;
    let resp = reqwest::get(format!("{url}/sync/pull")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    server.abort();

    let secondary = test_node(NodeRole::Secondary, "http://127.0.0.1:1");
    assert!(!secondary.node.serves_recovery());
    let (url, server) = serve(secondary.node.clone()).await;
    let resp = reqwest::get(format!("{url}/sync/pull")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    server.abort();
}
