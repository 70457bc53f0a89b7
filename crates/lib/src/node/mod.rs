//! Node wiring.
//!
//! A [`Node`] is one deployable unit: store, credential gate, health
//! monitor, replication engine, and scheduler behind an HTTP surface. The
//! two deployed nodes run the same implementation parameterized by
//! [`NodeRole`]; the role decides only which direction replication pushes.
//! There is no automatic promotion in either direction; recovery is an
//! operator pulling `/sync/pull` from the surviving node.

pub mod http;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::Result;
use crate::auth::{
    AccessPolicy, BlockListPolicy, CredentialGate, LoginAttempt, LoginSuccess, TokenRegistry,
};
use crate::clock::Clock;
use crate::constants::{
    DEFAULT_HEALTH_INTERVAL, DEFAULT_SYNC_INTERVAL, HEALTH_JOB, RECENT_ACTIVITY_LIMIT, SYNC_JOB,
};
use crate::scheduler::Scheduler;
use crate::store::NodeStore;
use crate::sync::protocol::HealthStatus;
use crate::sync::{HealthMonitor, ReplicationEngine};
use crate::types::{DiaryEntry, LoginActivity, NodeRole};

/// Startup configuration of a node. The role and peer are fixed for the
/// lifetime of the process and never persisted.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub role: NodeRole,
    /// Base URL of the peer node, e.g. `http://10.0.0.2:3000`.
    pub peer_url: String,
    pub sync_interval: Duration,
    pub health_interval: Duration,
    /// Whether this node serves the operator recovery pull. Defaults to the
    /// Primary only: it holds the merged copy a promoted node would need.
    pub recovery_endpoint: bool,
}

impl NodeConfig {
    pub fn new(role: NodeRole, peer_url: impl Into<String>) -> Self {
        Self {
            role,
            peer_url: peer_url.into(),
            sync_interval: DEFAULT_SYNC_INTERVAL,
            health_interval: DEFAULT_HEALTH_INTERVAL,
            recovery_endpoint: role == NodeRole::Primary,
        }
    }
}

/// Session activity listing returned to an authenticated user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ActivityListing {
    /// Most recent sessions, newest first, capped.
    pub recent: Vec<LoginActivity>,
    /// All currently-active sessions.
    pub active: Vec<LoginActivity>,
}

/// One deployable Memoir node.
pub struct Node {
    config: NodeConfig,
    store: Arc<dyn NodeStore>,
    gate: CredentialGate,
    health: Arc<HealthMonitor>,
    engine: Arc<ReplicationEngine>,
    scheduler: Scheduler,
    clock: Arc<dyn Clock>,
}

impl Node {
    /// Wire a node with the default block-list access policy.
    pub fn new(config: NodeConfig, store: Arc<dyn NodeStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(config, store, clock, Arc::new(BlockListPolicy))
    }

    /// Wire a node with an explicit access policy.
    pub fn with_policy(
        config: NodeConfig,
        store: Arc<dyn NodeStore>,
        clock: Arc<dyn Clock>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        let tokens = Arc::new(TokenRegistry::new(clock.clone()));
        let gate = CredentialGate::new(store.clone(), policy, tokens, clock.clone());
        let health = Arc::new(HealthMonitor::new(config.peer_url.clone(), clock.clone()));
        let engine = Arc::new(ReplicationEngine::new(store.clone(), health.clone()));
        Self {
            config,
            store,
            gate,
            health,
            engine,
            scheduler: Scheduler::new(),
            clock,
        }
    }

    pub fn role(&self) -> NodeRole {
        self.config.role
    }

    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    pub fn health_monitor(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    /// Whether the operator recovery pull is served by this node.
    pub fn serves_recovery(&self) -> bool {
        self.config.recovery_endpoint
    }

    /// Start the background jobs for this node's role. Both roles probe the
    /// peer; only the Secondary pushes.
    pub fn start_background_jobs(&self) -> Result<()> {
        let health = self.health.clone();
        self.scheduler
            .spawn_periodic(HEALTH_JOB, self.config.health_interval, move || {
                let health = health.clone();
                async move { health.probe().await }
            })
            .map_err(crate::Error::Scheduler)?;

        if self.config.role == NodeRole::Secondary {
            let engine = self.engine.clone();
            self.scheduler
                .spawn_periodic(SYNC_JOB, self.config.sync_interval, move || {
                    let engine = engine.clone();
                    async move { engine.push_cycle().await }
                })
                .map_err(crate::Error::Scheduler)?;
        }

        info!(role = %self.config.role, peer = %self.config.peer_url, "Background jobs started");
        Ok(())
    }

    /// Stop background jobs and wait for in-flight cycles to drain.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }

    /// Run one replication push cycle immediately, outside the schedule.
    /// Same swallow-and-log contract as the scheduled job.
    pub async fn push_now(&self) {
        self.engine.push_cycle().await;
    }

    // --- Client operations ---

    pub fn login(&self, attempt: LoginAttempt) -> Result<LoginSuccess> {
        self.gate.authenticate(attempt)
    }

    /// Deactivate every active session for a device.
    pub fn logout_device(&self, device_id: &str) -> Result<usize> {
        self.store.close_device(device_id, self.clock.now())
    }

    pub fn block_ip(&self, username: &str, ip: &str) -> Result<()> {
        self.store.block_ip(username, ip)
    }

    pub fn block_device(&self, username: &str, device_id: &str) -> Result<()> {
        self.store.block_device(username, device_id)
    }

    /// Activity listing for the user behind a bearer token.
    pub fn activity(&self, token: &str) -> Result<ActivityListing> {
        let username = self.gate.verify_token(token)?;
        Ok(ActivityListing {
            recent: self.store.list_recent(&username, RECENT_ACTIVITY_LIMIT)?,
            active: self.store.list_active(&username)?,
        })
    }

    /// Create a diary entry for the user behind a bearer token.
    pub fn create_entry(
        &self,
        token: &str,
        title: String,
        content: String,
        tags: std::collections::BTreeSet<String>,
    ) -> Result<DiaryEntry> {
        let username = self.gate.verify_token(token)?;
        let entry = DiaryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            title,
            content,
            created_at: self.clock.now(),
            tags,
            location: None,
            device: None,
        };
        self.store.put_entry(entry.clone())?;
        Ok(entry)
    }

    /// Recent diary entries for the user behind a bearer token.
    pub fn list_entries(&self, token: &str, limit: usize) -> Result<Vec<DiaryEntry>> {
        let username = self.gate.verify_token(token)?;
        self.store.entries_for(&username, limit)
    }

    /// Provision a user account on this node.
    pub fn register_user(&self, username: &str, secret: &str, backup_secret: &str) -> Result<()> {
        self.gate.register_user(username, secret, backup_secret)
    }

    // --- Operator / peer operations ---

    /// Body of this node's health endpoint. `status` follows store
    /// connectivity, so it never contradicts `store_connected`.
    pub fn health_status(&self) -> HealthStatus {
        let store_connected = self.store.is_connected();
        HealthStatus {
            status: if store_connected { "ok" } else { "degraded" }.to_string(),
            role: self.config.role,
            timestamp: self.clock.now(),
            store_connected,
        }
    }
}
