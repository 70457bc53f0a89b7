//! Error types for the authentication module.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while authenticating a login attempt.
///
/// `InvalidCredentials` deliberately covers both an unknown username and a
/// wrong secret, so callers cannot probe for account existence.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong secret; callers cannot tell which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The account is under an emergency lockout. Both primary and backup
    /// credentials are rejected until `until`.
    #[error("Account locked until {until}")]
    AccountLocked { until: DateTime<Utc> },

    /// The attempt carried no location. Side-effecting: the account has been
    /// locked and a suspicious session record written.
    #[error("Location required; account locked until {locked_until}")]
    LocationRequired { locked_until: DateTime<Utc> },

    /// Credential hashing failed. Internal; never caused by caller input.
    #[error("Credential hashing failed: {reason}")]
    HashingFailed { reason: String },

    /// The presented session token is unknown or expired.
    #[error("Invalid or expired session token")]
    InvalidToken,
}

impl AuthError {
    /// Check if this error should surface to the caller as a client fault
    /// rather than a server fault.
    pub fn is_client_fault(&self) -> bool {
        !matches!(self, AuthError::HashingFailed { .. })
    }

    /// Check if this error indicates an account-wide lockout.
    pub fn is_locked(&self) -> bool {
        matches!(self, AuthError::AccountLocked { .. })
    }
}
