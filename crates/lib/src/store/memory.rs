//! In-memory store implementation
//!
//! This module provides an in-memory implementation of the [`NodeStore`]
//! trait with optional JSON file persistence, suitable for single-process
//! nodes where the whole state is saved on shutdown and reloaded on start.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NodeStore, StoreError};
use crate::Result;
use crate::types::{DiaryEntry, LoginActivity, User};

/// Serializable snapshot of the full node state.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    users: HashMap<String, User>,
    sessions: Vec<LoginActivity>,
    diary: HashMap<String, DiaryEntry>,
}

/// A simple in-memory store using `RwLock`-guarded maps.
///
/// Provides basic persistence via [`save_to_file`](InMemory::save_to_file)
/// and [`load_from_file`](InMemory::load_from_file), serializing the whole
/// state to JSON. Suitable for a single-process node; the replication engine
/// is what provides durability across the deployment.
#[derive(Debug, Default)]
pub struct InMemory {
    users: RwLock<HashMap<String, User>>,
    /// Append-only ledger; records are mutated in place only by
    /// `close_device` and replaced wholesale only by `upsert_session`.
    sessions: RwLock<Vec<LoginActivity>>,
    diary: RwLock<HashMap<String, DiaryEntry>>,
}

impl InMemory {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves the entire store state to a file as JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let state = StoreState {
            users: self.users.read().unwrap().clone(),
            sessions: self.sessions.read().unwrap().clone(),
            diary: self.diary.read().unwrap().clone(),
        };
        let json = serde_json::to_string_pretty(&state)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads store state from a JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let state: StoreState =
            serde_json::from_str(&json).map_err(|e| StoreError::Serialization {
                reason: e.to_string(),
            })?;
        Ok(Self {
            users: RwLock::new(state.users),
            sessions: RwLock::new(state.sessions),
            diary: RwLock::new(state.diary),
        })
    }

    fn with_user<F>(&self, username: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(username)
            .ok_or_else(|| StoreError::UserNotFound {
                username: username.to_string(),
            })?;
        f(user);
        Ok(())
    }
}

impl NodeStore for InMemory {
    fn put_user(&self, user: User) -> Result<()> {
        self.users
            .write()
            .unwrap()
            .insert(user.username.clone(), user);
        Ok(())
    }

    fn get_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().unwrap().get(username).cloned())
    }

    fn block_ip(&self, username: &str, ip: &str) -> Result<()> {
        self.with_user(username, |user| {
            user.blocked_ips.insert(ip.to_string());
        })
    }

    fn block_device(&self, username: &str, device_id: &str) -> Result<()> {
        self.with_user(username, |user| {
            user.blocked_devices.insert(device_id.to_string());
        })
    }

    fn record_login(&self, session: LoginActivity) -> Result<()> {
        self.sessions.write().unwrap().push(session);
        Ok(())
    }

    fn close_device(&self, device_id: &str, now: DateTime<Utc>) -> Result<usize> {
        let mut sessions = self.sessions.write().unwrap();
        let mut closed = 0;
        for session in sessions
            .iter_mut()
            .filter(|s| s.is_active && s.device_id == device_id)
        {
            session.is_active = false;
            session.logout_time = Some(now);
            closed += 1;
        }
        Ok(closed)
    }

    fn list_recent(&self, username: &str, limit: usize) -> Result<Vec<LoginActivity>> {
        let sessions = self.sessions.read().unwrap();
        let mut recent: Vec<LoginActivity> = sessions
            .iter()
            .filter(|s| s.username == username)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.login_time.cmp(&a.login_time));
        recent.truncate(limit);
        Ok(recent)
    }

    fn list_active(&self, username: &str) -> Result<Vec<LoginActivity>> {
        let sessions = self.sessions.read().unwrap();
        Ok(sessions
            .iter()
            .filter(|s| s.username == username && s.is_active)
            .cloned()
            .collect())
    }

    fn recent_sessions(&self, limit: usize) -> Result<Vec<LoginActivity>> {
        let sessions = self.sessions.read().unwrap();
        let mut recent: Vec<LoginActivity> = sessions.iter().cloned().collect();
        recent.sort_by(|a, b| b.login_time.cmp(&a.login_time));
        recent.truncate(limit);
        Ok(recent)
    }

    fn upsert_session(&self, session: LoginActivity) -> Result<bool> {
        let mut sessions = self.sessions.write().unwrap();
        let key = session.key();
        match sessions.iter_mut().find(|s| s.key() == key) {
            Some(existing) => {
                *existing = session;
                Ok(false)
            }
            None => {
                sessions.push(session);
                Ok(true)
            }
        }
    }

    fn put_entry(&self, entry: DiaryEntry) -> Result<()> {
        self.diary.write().unwrap().insert(entry.id.clone(), entry);
        Ok(())
    }

    fn get_entry(&self, id: &str) -> Result<Option<DiaryEntry>> {
        Ok(self.diary.read().unwrap().get(id).cloned())
    }

    fn recent_entries(&self, limit: usize) -> Result<Vec<DiaryEntry>> {
        let diary = self.diary.read().unwrap();
        let mut recent: Vec<DiaryEntry> = diary.values().cloned().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }

    fn entries_for(&self, username: &str, limit: usize) -> Result<Vec<DiaryEntry>> {
        let diary = self.diary.read().unwrap();
        let mut recent: Vec<DiaryEntry> = diary
            .values()
            .filter(|e| e.username == username)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }

    fn upsert_entry(&self, entry: DiaryEntry) -> Result<bool> {
        let mut diary = self.diary.write().unwrap();
        Ok(diary.insert(entry.id.clone(), entry).is_none())
    }

    fn is_connected(&self) -> bool {
        // Memory is always reachable; a poisoned lock would panic before
        // this reports false.
        true
    }
}
