//! Access policy hook
//!
//! The credential gate consults an [`AccessPolicy`] exactly once per login
//! attempt, after credential verification and before any session record is
//! written. The hook exists as a separate seam so block-list enforcement is
//! an explicit, independently testable step rather than logic buried in the
//! gate.

use crate::types::{DeviceInfo, User};

use super::errors::AuthError;

/// Per-attempt access decision, consulted once per login.
pub trait AccessPolicy: Send + Sync {
    /// Allow or reject the attempt. Rejections surface to the caller with
    /// the returned error.
    fn check(&self, user: &User, device: &DeviceInfo) -> Result<(), AuthError>;
}

/// Rejects attempts from IPs or devices on the user's block lists.
///
/// Rejections use `InvalidCredentials` so the existence of a block is not
/// revealed to the blocked party.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockListPolicy;

impl AccessPolicy for BlockListPolicy {
    fn check(&self, user: &User, device: &DeviceInfo) -> Result<(), AuthError> {
        if user.blocked_ips.contains(&device.ip) {
            tracing::warn!(
                username = %user.username,
                ip = %device.ip,
                "Login attempt from blocked IP rejected"
            );
            return Err(AuthError::InvalidCredentials);
        }
        if user.blocked_devices.contains(&device.device_id) {
            tracing::warn!(
                username = %user.username,
                device_id = %device.device_id,
                "Login attempt from blocked device rejected"
            );
            return Err(AuthError::InvalidCredentials);
        }
        Ok(())
    }
}

/// Permits every attempt. Reproduces the behavior of recording block lists
/// without consulting them.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn check(&self, _user: &User, _device: &DeviceInfo) -> Result<(), AuthError> {
        Ok(())
    }
}
