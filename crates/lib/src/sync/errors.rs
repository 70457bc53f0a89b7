//! Error types for the replication module.

use thiserror::Error;

/// Errors that can occur during replication and health probing.
///
/// These are logged and swallowed by the background jobs; the next scheduled
/// cycle is the only retry.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SyncError {
    /// The peer's endpoint could not be reached.
    #[error("Peer unreachable at {address}: {reason}")]
    PeerUnreachable { address: String, reason: String },

    /// The peer answered with a non-success status.
    #[error("Peer at {address} returned status {status}")]
    PeerStatus { address: String, status: u16 },

    /// A sync push failed mid-cycle.
    #[error("Sync failure: {reason}")]
    SyncFailure { reason: String },

    /// The peer's response body could not be parsed.
    #[error("Malformed peer response: {reason}")]
    MalformedResponse { reason: String },
}

impl SyncError {
    /// Check if this error indicates the peer was unreachable at the
    /// transport level.
    pub fn is_peer_unreachable(&self) -> bool {
        matches!(self, SyncError::PeerUnreachable { .. })
    }
}
