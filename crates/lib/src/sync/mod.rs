//! Cross-node replication and health monitoring.
//!
//! The deployment is two nodes with no shared storage; consistency comes
//! only from the Secondary's periodic push of its recent records to the
//! Primary's ingest endpoints. Upserts are idempotent and last-write-wins:
//! no versioning, no conflict detection. Concurrent divergent writes to the
//! same key resolve by whichever upsert arrives last.
//!
//! Every failure in this module is logged and swallowed locally. Nothing
//! here is ever surfaced to a client, changes routing, or promotes a node.

mod engine;
mod errors;
mod health;
pub mod protocol;

pub use engine::{ReplicationEngine, pull_backup_data, upsert_diary_batch, upsert_session_batch};
pub use errors::SyncError;
pub use health::{HealthMonitor, PeerHealth};
