//! Storage layer for a Memoir node.
//!
//! Each node owns its own copy of all durable state; there is no shared
//! storage between the two nodes. The [`NodeStore`] trait abstracts the four
//! logical stores (credentials, session ledger, diary entries, and per-user
//! block lists) plus the last-write-wins upsert primitives the replication
//! engine is built on.

mod errors;
pub mod memory;

pub use errors::StoreError;
pub use memory::InMemory;

use chrono::{DateTime, Utc};

use crate::Result;
use crate::types::{DiaryEntry, LoginActivity, User};

/// Storage trait abstracting the durable state of a single node.
///
/// All implementations must be `Send + Sync` so a store can be shared
/// between request handlers and the background scheduler. Per-record writes
/// are atomic, but read-decide-write sequences spanning multiple calls are
/// not; the credential gate's lockout path is last-writer-wins.
pub trait NodeStore: Send + Sync {
    // --- Credential store ---

    /// Insert or replace a user record, keyed by username.
    fn put_user(&self, user: User) -> Result<()>;

    /// Look up a user by username.
    fn get_user(&self, username: &str) -> Result<Option<User>>;

    // --- Access control list ---

    /// Add an IP to a user's block list. Idempotent.
    fn block_ip(&self, username: &str, ip: &str) -> Result<()>;

    /// Add a device identifier to a user's block list. Idempotent.
    fn block_device(&self, username: &str, device_id: &str) -> Result<()>;

    // --- Session ledger ---

    /// Append a new session record. Never updates an existing one.
    fn record_login(&self, session: LoginActivity) -> Result<()>;

    /// Deactivate all currently-active records for a device, stamping
    /// `logout_time`. Returns how many records were closed.
    fn close_device(&self, device_id: &str, now: DateTime<Utc>) -> Result<usize>;

    /// Sessions for a user ordered by `login_time` descending, truncated to
    /// `limit`.
    fn list_recent(&self, username: &str, limit: usize) -> Result<Vec<LoginActivity>>;

    /// All active sessions for a user, unordered.
    fn list_active(&self, username: &str) -> Result<Vec<LoginActivity>>;

    /// Most recent sessions across all users, for replication reads.
    fn recent_sessions(&self, limit: usize) -> Result<Vec<LoginActivity>>;

    /// Insert-or-replace by (device_id, login_time). Returns `true` if a new
    /// record was inserted, `false` if an existing one was replaced.
    fn upsert_session(&self, session: LoginActivity) -> Result<bool>;

    // --- Diary store ---

    /// Insert or replace a diary entry, keyed by id.
    fn put_entry(&self, entry: DiaryEntry) -> Result<()>;

    /// Look up a diary entry by id.
    fn get_entry(&self, id: &str) -> Result<Option<DiaryEntry>>;

    /// Most recent diary entries across all users, newest first.
    fn recent_entries(&self, limit: usize) -> Result<Vec<DiaryEntry>>;

    /// Most recent diary entries for one user, newest first.
    fn entries_for(&self, username: &str, limit: usize) -> Result<Vec<DiaryEntry>>;

    /// Insert-or-replace by entry id. Returns `true` if a new record was
    /// inserted, `false` if an existing one was replaced.
    fn upsert_entry(&self, entry: DiaryEntry) -> Result<bool>;

    // --- Liveness ---

    /// Whether the underlying persistence is reachable. Reported by the
    /// health endpoint.
    fn is_connected(&self) -> bool;
}
