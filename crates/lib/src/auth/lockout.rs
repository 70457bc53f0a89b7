//! Lockout policy
//!
//! A lockout is a temporary, account-wide ban on all authentication,
//! regardless of the credential used. The only trigger in this system is a
//! login attempt that verified correctly but carried no location.

use chrono::{DateTime, Duration, Utc};

use crate::constants::LOCKOUT_MINUTES;
use crate::types::User;

/// Lock the account for the fixed policy window starting at `now`.
///
/// Unconditionally overwrites any existing lock: a new trigger during an
/// active lock resets the window from the new trigger time, with no
/// extension or stacking. There is no unlock operation besides the passage
/// of time.
pub fn trigger_lockout(user: &mut User, now: DateTime<Utc>) -> DateTime<Utc> {
    let until = now + Duration::minutes(LOCKOUT_MINUTES);
    user.emergency_lock_until = Some(until);
    until
}
