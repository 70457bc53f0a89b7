//! Constants used throughout the Memoir library.
//!
//! This module provides central definitions for the fixed policy values of
//! the login state machine and the replication protocol.

use std::time::Duration;

/// How long an emergency lockout lasts. A new trigger resets the window from
/// the new trigger time; there is no stacking.
pub const LOCKOUT_MINUTES: i64 = 15;

/// Lifetime of an issued session token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Number of random bytes in a session token before hex encoding.
pub const TOKEN_BYTES: usize = 32;

/// How many recent records the Secondary pushes to the Primary per cycle.
pub const SYNC_BATCH_LIMIT: usize = 50;

/// Upper bound on each entity list returned by the recovery pull.
pub const RECOVERY_PULL_LIMIT: usize = 100;

/// Default cap on the "recent sessions" activity listing.
pub const RECENT_ACTIVITY_LIMIT: usize = 20;

/// Default interval between replication push cycles.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Default interval between peer health probes. Independent of the sync
/// interval.
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

/// Scheduler job name for the replication push.
pub const SYNC_JOB: &str = "replication_push";

/// Scheduler job name for the peer health probe.
pub const HEALTH_JOB: &str = "health_probe";
