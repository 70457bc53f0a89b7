//! Protocol definitions for node-to-node communication.
//!
//! These are the JSON bodies exchanged between the two nodes' ingest,
//! recovery, and health endpoints. Batches are plain lists of the stored
//! record types; records replicate verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DiaryEntry, LoginActivity, NodeRole};

/// A batch of diary entries for ingest.
pub type DiaryBatch = Vec<DiaryEntry>;

/// A batch of session records for ingest.
pub type SessionBatch = Vec<LoginActivity>;

/// Acknowledgment returned by the ingest endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncCount {
    /// Number of records applied from the batch.
    pub synced: usize,
}

/// Read-only snapshot served by the recovery pull endpoint, bounded to the
/// most recent records of each entity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackupSnapshot {
    pub diary_entries: DiaryBatch,
    pub sessions: SessionBatch,
}

/// Body of the health endpoint, also consumed by the peer's health monitor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub role: NodeRole,
    pub timestamp: DateTime<Utc>,
    pub store_connected: bool,
}

impl HealthStatus {
    /// Whether the reporting node considers itself healthy.
    pub fn is_ok(&self) -> bool {
        self.status == "ok" && self.store_connected
    }
}
