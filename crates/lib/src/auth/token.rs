//! Session token registry
//!
//! Successful logins are answered with an opaque bearer token. Issued
//! tokens are remembered server-side with an expiry, and protected reads
//! derive the acting user from a presented token instead of trusting a
//! caller-supplied username.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

use crate::Result;
use crate::clock::Clock;
use crate::constants::{TOKEN_BYTES, TOKEN_TTL_HOURS};

use super::errors::AuthError;

#[derive(Debug, Clone)]
struct TokenEntry {
    username: String,
    expires_at: DateTime<Utc>,
}

/// Server-side record of issued session tokens.
///
/// Tokens are random 32-byte values, hex encoded, valid for a fixed TTL.
/// There is no refresh flow; an expired token simply stops verifying.
pub struct TokenRegistry {
    tokens: RwLock<HashMap<String, TokenEntry>>,
    clock: Arc<dyn Clock>,
}

impl TokenRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Mint and register a token for `username`.
    pub fn issue(&self, username: &str) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let entry = TokenEntry {
            username: username.to_string(),
            expires_at: self.clock.now() + Duration::hours(TOKEN_TTL_HOURS),
        };
        let mut tokens = self.tokens.write().unwrap();
        // Opportunistically drop expired tokens so the map does not grow
        // unbounded across long uptimes.
        let now = self.clock.now();
        tokens.retain(|_, e| e.expires_at > now);
        tokens.insert(token.clone(), entry);
        token
    }

    /// Resolve a presented token to its username, if valid and unexpired.
    pub fn verify(&self, token: &str) -> Result<String> {
        let tokens = self.tokens.read().unwrap();
        match tokens.get(token) {
            Some(entry) if entry.expires_at > self.clock.now() => Ok(entry.username.clone()),
            _ => Err(AuthError::InvalidToken.into()),
        }
    }

    /// Forget every token issued to `username`.
    pub fn revoke_user(&self, username: &str) {
        self.tokens
            .write()
            .unwrap()
            .retain(|_, e| e.username != username);
    }
}
