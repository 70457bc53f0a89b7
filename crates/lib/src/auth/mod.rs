//! Credential gate: the login-security state machine.
//!
//! [`CredentialGate::authenticate`] drives a fixed sequence per attempt:
//! user lookup, lockout check, constant-time credential verification, the
//! access-policy hook, then the geofence branch. A missing location locks
//! the account for 15 minutes and records a suspicious session; a present
//! location records an active session and mints a bearer token.
//!
//! Side effects are durable writes to the credential store and session
//! ledger. Nothing is rolled back if a later step fails mid-attempt; the
//! sequence is not atomic across concurrent attempts for the same user
//! (last writer wins on the lock field).

mod crypto;
mod errors;
mod lockout;
mod policy;
mod token;

pub use crypto::{hash_secret, verify_secret};
pub use errors::AuthError;
pub use lockout::trigger_lockout;
pub use policy::{AccessPolicy, AllowAll, BlockListPolicy};
pub use token::TokenRegistry;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;
use crate::clock::Clock;
use crate::store::NodeStore;
use crate::types::{DeviceInfo, GeoPoint, LoginActivity, User};

/// One login attempt as presented by a client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub username: String,
    pub secret: String,
    /// Verify against the backup credential hash instead of the primary.
    #[serde(default)]
    pub use_backup: bool,
    pub device: DeviceInfo,
    /// Absent location triggers the geofence lockout.
    pub location: Option<GeoPoint>,
}

/// The successful-login response contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginSuccess {
    /// Opaque bearer token; callers treat it as a capability.
    pub session_token: String,
    pub username: String,
    /// Whether the client should still prompt for notification permission.
    pub requires_notification_permission: bool,
}

/// Authenticates login attempts against the credential store.
pub struct CredentialGate {
    store: Arc<dyn NodeStore>,
    policy: Arc<dyn AccessPolicy>,
    tokens: Arc<TokenRegistry>,
    clock: Arc<dyn Clock>,
}

impl CredentialGate {
    pub fn new(
        store: Arc<dyn NodeStore>,
        policy: Arc<dyn AccessPolicy>,
        tokens: Arc<TokenRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policy,
            tokens,
            clock,
        }
    }

    /// Authenticate one login attempt.
    ///
    /// Failure taxonomy: [`AuthError::InvalidCredentials`] for an unknown
    /// user, wrong secret, or policy rejection; [`AuthError::AccountLocked`]
    /// while a lockout is active (checked before verification, and applying
    /// to backup credentials too); [`AuthError::LocationRequired`] when the
    /// credentials verified but no location was supplied; by then the
    /// account has already been locked and a suspicious session recorded.
    pub fn authenticate(&self, attempt: LoginAttempt) -> Result<LoginSuccess> {
        let now = self.clock.now();

        let mut user = self
            .store
            .get_user(&attempt.username)?
            .ok_or(AuthError::InvalidCredentials)?;

        // Lockout precedes verification and applies to both credentials.
        if let Some(until) = user.emergency_lock_until
            && until > now
        {
            debug!(username = %user.username, %until, "Login rejected: account locked");
            return Err(AuthError::AccountLocked { until }.into());
        }

        let stored_hash = if attempt.use_backup {
            &user.backup_credential_hash
        } else {
            &user.credential_hash
        };
        verify_secret(&attempt.secret, stored_hash)?;

        // Policy hook: exactly once per attempt, after verification, before
        // any session record is written.
        self.policy.check(&user, &attempt.device)?;

        let Some(location) = attempt.location else {
            let locked_until = trigger_lockout(&mut user, now);
            self.store.put_user(user)?;
            self.store.record_login(LoginActivity {
                username: attempt.username.clone(),
                device_id: attempt.device.device_id,
                device_name: attempt.device.device_name,
                ip: attempt.device.ip,
                location: None,
                login_time: now,
                logout_time: None,
                is_active: false,
                is_suspicious: true,
            })?;
            warn!(
                username = %attempt.username,
                %locked_until,
                "Login without location: account locked, suspicious session recorded"
            );
            return Err(AuthError::LocationRequired { locked_until }.into());
        };

        user.last_login = Some(now);
        let requires_notification_permission = !user.notifications_enabled;
        let username = user.username.clone();
        self.store.put_user(user)?;
        self.store.record_login(LoginActivity {
            username: username.clone(),
            device_id: attempt.device.device_id.clone(),
            device_name: attempt.device.device_name,
            ip: attempt.device.ip,
            location: Some(location),
            login_time: now,
            logout_time: None,
            is_active: true,
            is_suspicious: false,
        })?;

        let session_token = self.tokens.issue(&username);
        info!(username = %username, device_id = %attempt.device.device_id, "Login succeeded");

        Ok(LoginSuccess {
            session_token,
            username,
            requires_notification_permission,
        })
    }

    /// Resolve a bearer token to the acting username.
    pub fn verify_token(&self, token: &str) -> Result<String> {
        self.tokens.verify(token)
    }

    /// Provision a user with hashed primary and backup secrets.
    pub fn register_user(&self, username: &str, secret: &str, backup_secret: &str) -> Result<()> {
        let user = User {
            username: username.to_string(),
            credential_hash: hash_secret(secret)?,
            backup_credential_hash: hash_secret(backup_secret)?,
            location_sharing: false,
            notifications_enabled: false,
            notification_address: None,
            blocked_ips: Default::default(),
            blocked_devices: Default::default(),
            emergency_lock_until: None,
            last_login: None,
        };
        self.store.put_user(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration;

    use super::*;
    use crate::clock::FixedClock;
    use crate::constants::LOCKOUT_MINUTES;
    use crate::store::InMemory;

    struct CountingPolicy {
        calls: AtomicUsize,
        inner: BlockListPolicy,
    }

    impl AccessPolicy for CountingPolicy {
        fn check(&self, user: &User, device: &DeviceInfo) -> std::result::Result<(), AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.check(user, device)
        }
    }

    struct Fixture {
        store: Arc<InMemory>,
        clock: Arc<FixedClock>,
        policy: Arc<CountingPolicy>,
        gate: CredentialGate,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemory::new());
        let clock = Arc::new(FixedClock::default());
        let policy = Arc::new(CountingPolicy {
            calls: AtomicUsize::new(0),
            inner: BlockListPolicy,
        });
        let tokens = Arc::new(TokenRegistry::new(clock.clone()));
        let gate = CredentialGate::new(store.clone(), policy.clone(), tokens, clock.clone());
        gate.register_user("alice", "primary-secret", "backup-secret")
            .unwrap();
        Fixture {
            store,
            clock,
            policy,
            gate,
        }
    }

    fn attempt(secret: &str, use_backup: bool, location: Option<GeoPoint>) -> LoginAttempt {
        LoginAttempt {
            username: "alice".to_string(),
            secret: secret.to_string(),
            use_backup,
            device: DeviceInfo {
                device_id: "d1".to_string(),
                device_name: "phone".to_string(),
                ip: "10.0.0.1".to_string(),
            },
            location,
        }
    }

    fn here() -> GeoPoint {
        GeoPoint {
            lat: 51.5,
            lon: -0.1,
            accuracy: 12.0,
        }
    }

    #[test]
    fn unknown_user_and_wrong_secret_are_indistinguishable() {
        let f = fixture();
        let unknown = f
            .gate
            .authenticate(LoginAttempt {
                username: "nobody".to_string(),
                ..attempt("primary-secret", false, Some(here()))
            })
            .unwrap_err();
        let wrong = f
            .gate
            .authenticate(attempt("bad-secret", false, Some(here())))
            .unwrap_err();
        assert!(unknown.is_invalid_credentials());
        assert!(wrong.is_invalid_credentials());
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn successful_login_records_active_session_and_token() {
        let f = fixture();
        let success = f
            .gate
            .authenticate(attempt("primary-secret", false, Some(here())))
            .unwrap();
        assert_eq!(success.username, "alice");
        assert!(success.requires_notification_permission);
        assert_eq!(f.gate.verify_token(&success.session_token).unwrap(), "alice");

        let user = f.store.get_user("alice").unwrap().unwrap();
        assert_eq!(user.last_login, Some(f.clock.now()));

        let active = f.store.list_active("alice").unwrap();
        assert_eq!(active.len(), 1);
        assert!(!active[0].is_suspicious);
        assert_eq!(active[0].location, Some(here()));
    }

    #[test]
    fn missing_location_locks_account_and_records_suspicious_session() {
        let f = fixture();
        let err = f
            .gate
            .authenticate(attempt("primary-secret", false, None))
            .unwrap_err();
        let crate::Error::Auth(AuthError::LocationRequired { locked_until }) = err else {
            panic!("expected LocationRequired, got {err}");
        };

        // Lock is exactly attempt time + 15 minutes.
        let user = f.store.get_user("alice").unwrap().unwrap();
        assert_eq!(
            user.emergency_lock_until,
            Some(f.clock.now() + Duration::minutes(LOCKOUT_MINUTES))
        );
        assert_eq!(user.emergency_lock_until, Some(locked_until));

        // Exactly one new session record, suspicious and inactive.
        let recent = f.store.list_recent("alice", 10).unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].is_suspicious);
        assert!(!recent[0].is_active);
    }

    #[test]
    fn backup_credential_does_not_bypass_active_lock() {
        let f = fixture();
        // Trigger the lock via a location-less attempt.
        let _ = f.gate.authenticate(attempt("primary-secret", false, None));

        // Immediate retry with the correct backup secret and a location.
        let err = f
            .gate
            .authenticate(attempt("backup-secret", true, Some(here())))
            .unwrap_err();
        assert!(err.is_account_locked());
    }

    #[test]
    fn lock_expires_with_time() {
        let f = fixture();
        let _ = f.gate.authenticate(attempt("primary-secret", false, None));
        f.clock.advance_secs(LOCKOUT_MINUTES * 60 + 1);
        assert!(
            f.gate
                .authenticate(attempt("backup-secret", true, Some(here())))
                .is_ok()
        );
    }

    #[test]
    fn relock_overwrites_prior_lock_window() {
        let f = fixture();
        let _ = f.gate.authenticate(attempt("primary-secret", false, None));
        let first_lock = f
            .store
            .get_user("alice")
            .unwrap()
            .unwrap()
            .emergency_lock_until
            .unwrap();

        // After the first lock expires, a new location-less attempt re-locks
        // from its own attempt time.
        f.clock.advance_secs(LOCKOUT_MINUTES * 60 + 1);
        let _ = f.gate.authenticate(attempt("primary-secret", false, None));
        let second_lock = f
            .store
            .get_user("alice")
            .unwrap()
            .unwrap()
            .emergency_lock_until
            .unwrap();
        assert_eq!(
            second_lock,
            f.clock.now() + Duration::minutes(LOCKOUT_MINUTES)
        );
        assert!(second_lock > first_lock);
    }

    #[test]
    fn policy_hook_is_invoked_once_per_verified_attempt() {
        let f = fixture();
        let _ = f
            .gate
            .authenticate(attempt("primary-secret", false, Some(here())));
        assert_eq!(f.policy.calls.load(Ordering::SeqCst), 1);

        let _ = f.gate.authenticate(attempt("primary-secret", false, None));
        assert_eq!(f.policy.calls.load(Ordering::SeqCst), 2);

        // Failed verification never reaches the hook.
        let _ = f
            .gate
            .authenticate(attempt("bad-secret", false, Some(here())));
        assert_eq!(f.policy.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn blocked_ip_is_rejected_after_verification() {
        let f = fixture();
        f.store.block_ip("alice", "10.0.0.1").unwrap();
        let err = f
            .gate
            .authenticate(attempt("primary-secret", false, Some(here())))
            .unwrap_err();
        assert!(err.is_invalid_credentials());
        // The rejected attempt writes no session record.
        assert!(f.store.list_recent("alice", 10).unwrap().is_empty());
    }
}
