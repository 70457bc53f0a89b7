//! Replication engine.
//!
//! The ingest half, [`upsert_diary_batch`] and [`upsert_session_batch`],
//! runs on whichever node receives a push: idempotent last-write-wins
//! upserts keyed by diary id and by (device_id, login_time) respectively.
//!
//! The push half, [`ReplicationEngine::push_cycle`], runs as a periodic
//! job on the Secondary only. Each cycle reads the node's own most recent
//! records and POSTs them to the Primary's ingest endpoints, but only if
//! the latest health probe of the Primary succeeded. A failed cycle is
//! logged; the next scheduled cycle is the only retry.

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span};

use super::errors::SyncError;
use super::health::HealthMonitor;
use super::protocol::{BackupSnapshot, DiaryBatch, SessionBatch, SyncCount};
use crate::Result;
use crate::constants::{RECOVERY_PULL_LIMIT, SYNC_BATCH_LIMIT};
use crate::store::NodeStore;

/// Apply a diary batch: insert-or-replace each entry by id.
///
/// Applying the same batch twice yields the same final record set as
/// applying it once.
pub fn upsert_diary_batch(store: &dyn NodeStore, entries: DiaryBatch) -> Result<SyncCount> {
    let mut synced = 0;
    for entry in entries {
        store.upsert_entry(entry)?;
        synced += 1;
    }
    Ok(SyncCount { synced })
}

/// Apply a session batch: insert-or-replace each record by
/// (device_id, login_time).
pub fn upsert_session_batch(store: &dyn NodeStore, sessions: SessionBatch) -> Result<SyncCount> {
    let mut synced = 0;
    for session in sessions {
        store.upsert_session(session)?;
        synced += 1;
    }
    Ok(SyncCount { synced })
}

/// Read-only snapshot for operator-driven recovery of a promoted node,
/// bounded to the most recent records of each entity.
pub fn pull_backup_data(store: &dyn NodeStore) -> Result<BackupSnapshot> {
    Ok(BackupSnapshot {
        diary_entries: store.recent_entries(RECOVERY_PULL_LIMIT)?,
        sessions: store.recent_sessions(RECOVERY_PULL_LIMIT)?,
    })
}

/// Classify a failed push cycle. Transport errors pass through; anything
/// else (a store read failing mid-cycle) surfaces as [`SyncError::SyncFailure`].
fn cycle_failure(e: crate::Error) -> SyncError {
    match e {
        crate::Error::Sync(e) => e,
        other => SyncError::SyncFailure {
            reason: other.to_string(),
        },
    }
}

/// Pushes this node's recent records to its peer.
pub struct ReplicationEngine {
    store: Arc<dyn NodeStore>,
    health: Arc<HealthMonitor>,
    client: reqwest::Client,
    peer_url: String,
}

impl ReplicationEngine {
    pub fn new(store: Arc<dyn NodeStore>, health: Arc<HealthMonitor>) -> Self {
        let peer_url = health.peer_url().to_string();
        Self {
            store,
            health,
            client: reqwest::Client::new(),
            peer_url,
        }
    }

    /// Run one push cycle. Never fails outward: a skipped or failed cycle
    /// is logged, and the next scheduled cycle retries from scratch.
    pub async fn push_cycle(&self) {
        async {
            if !self.health.peer_is_up() {
                debug!(peer = %self.peer_url, "Skipping push: latest health probe failed");
                return;
            }

            match self.push_recent().await {
                Ok((diary, sessions)) => {
                    info!(
                        peer = %self.peer_url,
                        diary_synced = diary,
                        sessions_synced = sessions,
                        "Push cycle completed"
                    );
                }
                Err(e) => {
                    let e = cycle_failure(e);
                    error!(peer = %self.peer_url, "Push cycle failed: {e}");
                }
            }
        }
        .instrument(info_span!("replication_push"))
        .await
    }

    /// Push the most recent diary entries and sessions to the peer's ingest
    /// endpoints. Returns the counts the peer acknowledged.
    async fn push_recent(&self) -> Result<(usize, usize)> {
        let entries = self.store.recent_entries(SYNC_BATCH_LIMIT)?;
        let sessions = self.store.recent_sessions(SYNC_BATCH_LIMIT)?;

        let diary_count = if entries.is_empty() {
            0
        } else {
            self.post_batch("/sync/diary", &entries).await?.synced
        };
        let session_count = if sessions.is_empty() {
            0
        } else {
            self.post_batch("/sync/sessions", &sessions).await?.synced
        };

        Ok((diary_count, session_count))
    }

    async fn post_batch<T: serde::Serialize>(&self, path: &str, batch: &[T]) -> Result<SyncCount> {
        let url = format!("{}{path}", self.peer_url);
        let response = self
            .client
            .post(&url)
            .json(batch)
            .send()
            .await
            .map_err(|e| SyncError::PeerUnreachable {
                address: self.peer_url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SyncError::PeerStatus {
                address: self.peer_url.clone(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let count: SyncCount = response
            .json()
            .await
            .map_err(|e| SyncError::MalformedResponse {
                reason: e.to_string(),
            })?;
        Ok(count)
    }
}
