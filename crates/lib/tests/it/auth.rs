//! Login-security state machine scenarios against the public node API.

use chrono::Duration;
use memoir::Clock;
use memoir::auth::AuthError;
use memoir::constants::LOCKOUT_MINUTES;
use memoir::store::NodeStore;
use memoir::types::NodeRole;

use crate::helpers::{attempt, here, test_node};

#[test]
fn geofence_denial_then_backup_retry_stays_locked() {
    let t = test_node(NodeRole::Primary, "http://127.0.0.1:1");

    // Correct password, no location: LocationRequired, lock set to now+15m,
    // exactly one suspicious session record.
    let err = t.node.login(attempt("primary-secret", false, None)).unwrap_err();
    assert!(matches!(
        err,
        memoir::Error::Auth(AuthError::LocationRequired { .. })
    ));

    let user = t.store.get_user("alice").unwrap().unwrap();
    assert_eq!(
        user.emergency_lock_until,
        Some(t.clock.now() + Duration::minutes(LOCKOUT_MINUTES))
    );
    let recent = t.store.list_recent("alice", 10).unwrap();
    assert_eq!(recent.len(), 1);
    assert!(recent[0].is_suspicious);

    // Immediate retry with the correct backup password and a valid
    // location: still AccountLocked, the backup credential does not bypass.
    let err = t
        .node
        .login(attempt("backup-secret", true, Some(here())))
        .unwrap_err();
    assert!(err.is_account_locked());
}

#[test]
fn lock_expiry_restores_login() {
    let t = test_node(NodeRole::Primary, "http://127.0.0.1:1");
    let _ = t.node.login(attempt("primary-secret", false, None));

    t.clock.advance_secs(LOCKOUT_MINUTES * 60 + 1);
    let success = t
        .node
        .login(attempt("primary-secret", false, Some(here())))
        .unwrap();
    assert_eq!(success.username, "alice");
    assert_eq!(t.store.list_active("alice").unwrap().len(), 1);
}

#[test]
fn block_ip_is_idempotent() {
    let t = test_node(NodeRole::Primary, "http://127.0.0.1:1");
    for _ in 0..3 {
        t.node.block_ip("alice", "203.0.113.7").unwrap();
    }
    let user = t.store.get_user("alice").unwrap().unwrap();
    // Set membership: contained exactly once after any number of calls.
    assert_eq!(user.blocked_ips.len(), 1);
    assert!(user.blocked_ips.contains("203.0.113.7"));
}

#[test]
fn logout_device_closes_every_active_session_for_it() {
    let t = test_node(NodeRole::Primary, "http://127.0.0.1:1");
    t.node.login(attempt("primary-secret", false, Some(here()))).unwrap();
    t.clock.advance_secs(60);
    t.node.login(attempt("primary-secret", false, Some(here()))).unwrap();

    assert_eq!(t.node.logout_device("d1").unwrap(), 2);
    assert!(t.store.list_active("alice").unwrap().is_empty());
}
