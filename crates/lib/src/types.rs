//! Core data types shared across the node.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account stored in the credential store.
///
/// Users are keyed by their unique username. Both the primary and the backup
/// secret are stored as Argon2id PHC hash strings; an active
/// `emergency_lock_until` blocks every authentication attempt for this user
/// regardless of which credential is supplied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    /// Unique username (login identifier)
    pub username: String,

    /// Argon2id hash of the primary secret (PHC format)
    pub credential_hash: String,

    /// Argon2id hash of the backup secret (PHC format)
    pub backup_credential_hash: String,

    /// Whether the user has granted location sharing
    pub location_sharing: bool,

    /// Whether the user has granted notifications
    pub notifications_enabled: bool,

    /// External address for out-of-band notifications, if any
    pub notification_address: Option<String>,

    /// IPs this user has blocked
    pub blocked_ips: BTreeSet<String>,

    /// Device identifiers this user has blocked
    pub blocked_devices: BTreeSet<String>,

    /// While set and in the future, all authentication is rejected
    pub emergency_lock_until: Option<DateTime<Utc>>,

    /// Last successful login, if any
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the account is locked as of `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.emergency_lock_until, Some(until) if until > now)
    }
}

/// Device identity supplied with a login attempt.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_id: String,
    pub device_name: String,
    pub ip: String,
}

/// A geographic point with reported accuracy in meters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub accuracy: f64,
}

/// One login session record in the session ledger.
///
/// Records are append-only; `close_device` flips `is_active` off in bulk for
/// a device. Across nodes a record is identified by the composite
/// (device_id, login_time), which is the replication upsert key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginActivity {
    /// Owning user
    pub username: String,
    pub device_id: String,
    pub device_name: String,
    pub ip: String,
    /// Location supplied with the attempt, absent for geofence-denied logins
    pub location: Option<GeoPoint>,
    pub login_time: DateTime<Utc>,
    pub logout_time: Option<DateTime<Utc>>,
    /// Not yet logged out; intended to be unique per device
    pub is_active: bool,
    /// Set for attempts denied for missing location
    pub is_suspicious: bool,
}

impl LoginActivity {
    /// The cross-node identity of this record.
    pub fn key(&self) -> SessionKey {
        SessionKey {
            device_id: self.device_id.clone(),
            login_time: self.login_time,
        }
    }
}

/// Replication identity of a session record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey {
    pub device_id: String,
    pub login_time: DateTime<Utc>,
}

/// A diary entry. Created by the diary-write endpoint and replicated
/// verbatim between nodes, keyed by `id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DiaryEntry {
    pub id: String,
    /// Owning user
    pub username: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub location: Option<GeoPoint>,
    pub device: Option<DeviceInfo>,
}

/// Deployment role of a node. Fixed at startup, never persisted.
///
/// The role determines replication push direction (Secondary pushes to
/// Primary) and which operator-facing recovery surface is relevant.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Primary,
    Secondary,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Primary => write!(f, "primary"),
            NodeRole::Secondary => write!(f, "secondary"),
        }
    }
}

impl std::str::FromStr for NodeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(NodeRole::Primary),
            "secondary" => Ok(NodeRole::Secondary),
            other => Err(format!("unknown node role: {other}")),
        }
    }
}
