//! Storage error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// User not found by username.
    #[error("User not found: {username}")]
    UserNotFound { username: String },

    /// Diary entry not found by id.
    #[error("Diary entry not found: {id}")]
    EntryNotFound { id: String },

    /// Persistence unreachable. Surfaced to callers as a generic server
    /// error.
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    /// Failed to serialize or deserialize persisted state.
    #[error("Store serialization failed: {reason}")]
    Serialization { reason: String },
}

impl StoreError {
    /// Check if this error indicates a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::UserNotFound { .. } | StoreError::EntryNotFound { .. }
        )
    }

    /// Check if this error indicates persistence was unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}
