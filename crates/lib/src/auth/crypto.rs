//! Credential hashing for the credential gate
//!
//! Secrets are hashed with Argon2id and stored as PHC strings. Verification
//! goes through `argon2`'s `PasswordVerifier`, which performs the comparison
//! in constant time.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};

use super::errors::AuthError;
use crate::Result;

/// Hash a secret using Argon2id.
///
/// Returns the Argon2 hash string in PHC format, which embeds the salt.
pub fn hash_secret(secret: impl AsRef<str>) -> Result<String> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    let hash = Argon2::default()
        .hash_password(secret.as_ref().as_bytes(), &salt)
        .map_err(|e| AuthError::HashingFailed {
            reason: e.to_string(),
        })?
        .to_string();

    Ok(hash)
}

/// Verify a secret against its stored hash.
///
/// A malformed stored hash is reported as `InvalidCredentials` like any
/// mismatch, so nothing about the stored record leaks to the caller.
pub fn verify_secret(secret: impl AsRef<str>, stored_hash: impl AsRef<str>) -> Result<()> {
    let parsed = PasswordHash::new(stored_hash.as_ref())
        .map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(secret.as_ref().as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials.into())
}
