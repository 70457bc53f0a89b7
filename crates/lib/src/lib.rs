//!
//! Memoir: the backend for a replicated personal diary application.
//!
//! A Memoir deployment is two independent nodes, a Primary and a Secondary,
//! each owning its own copy of the data. This library provides the core
//! components shared by both:
//!
//! * **Stores (`store`)**: durable per-node state: users and credentials,
//!   the session ledger, diary entries, and per-user block lists.
//! * **Credential Gate (`auth`)**: the login state machine: credential
//!   verification, geofence-based lockout, block-list policy, and opaque
//!   session tokens.
//! * **Replication (`sync`)**: last-write-wins batch upserts pushed from the
//!   Secondary to the Primary, gated by peer health probes.
//! * **Scheduler (`scheduler`)**: named periodic background jobs with
//!   per-job overlap protection and cooperative shutdown.
//! * **Node (`node`)**: one deployable unit parameterized by role, wiring
//!   the above behind an HTTP surface.

pub mod auth;
pub mod clock;
pub mod commands;
pub mod constants;
pub mod node;
pub mod scheduler;
pub mod store;
pub mod sync;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use node::{Node, NodeConfig};
pub use types::NodeRole;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;

/// Result type used throughout the Memoir library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Memoir library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured authentication errors from the auth module
    #[error(transparent)]
    Auth(#[from] auth::AuthError),

    /// Structured storage errors from the store module
    #[error(transparent)]
    Store(#[from] store::StoreError),

    /// Structured replication errors from the sync module
    #[error(transparent)]
    Sync(#[from] sync::SyncError),

    /// Structured scheduler errors from the scheduler module
    #[error(transparent)]
    Scheduler(#[from] scheduler::SchedulerError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::Store(_) => "store",
            Error::Sync(_) => "sync",
            Error::Scheduler(_) => "scheduler",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check if this error indicates the caller supplied bad credentials.
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, Error::Auth(auth::AuthError::InvalidCredentials))
    }

    /// Check if this error indicates an account-wide lockout.
    pub fn is_account_locked(&self) -> bool {
        matches!(self, Error::Auth(auth::AuthError::AccountLocked { .. }))
    }

    /// Check if this error indicates persistence was unreachable.
    pub fn is_store_unavailable(&self) -> bool {
        match self {
            Error::Store(e) => e.is_unavailable(),
            _ => false,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is replication-related.
    pub fn is_sync_error(&self) -> bool {
        matches!(self, Error::Sync(_))
    }
}
