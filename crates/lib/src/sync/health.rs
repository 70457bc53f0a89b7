//! Peer health monitoring.
//!
//! Each node polls its peer's health endpoint on a fixed interval,
//! independent of the replication interval. The probe result is advisory
//! only: it gates the Secondary's push cycle and feeds operator-facing
//! status, but a failed probe never rejects client traffic and never
//! triggers a promotion. Operators redirect traffic manually if the Primary
//! is judged down.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::errors::SyncError;
use super::protocol::HealthStatus;
use crate::Result;
use crate::clock::Clock;

/// Latest known state of the peer, updated by each probe.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PeerHealth {
    /// Whether the most recent probe succeeded.
    pub reachable: bool,
    pub last_probe: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

/// Probes the peer node's health endpoint and records the result.
pub struct HealthMonitor {
    peer_url: String,
    client: reqwest::Client,
    state: RwLock<PeerHealth>,
    clock: Arc<dyn Clock>,
}

impl HealthMonitor {
    pub fn new(peer_url: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            peer_url: peer_url.into(),
            client: reqwest::Client::new(),
            state: RwLock::new(PeerHealth::default()),
            clock,
        }
    }

    /// The peer base URL this monitor probes.
    pub fn peer_url(&self) -> &str {
        &self.peer_url
    }

    /// Latest probe state.
    pub fn snapshot(&self) -> PeerHealth {
        self.state.read().unwrap().clone()
    }

    /// Whether the latest probe of the peer succeeded. A node that has
    /// never probed successfully reports `false`.
    pub fn peer_is_up(&self) -> bool {
        self.state.read().unwrap().reachable
    }

    /// Run one probe cycle. Failures are recorded and logged only; this
    /// never returns an error and never alters routing.
    pub async fn probe(&self) {
        match self.fetch_peer_health().await {
            Ok(status) if status.is_ok() => {
                debug!(peer = %self.peer_url, role = %status.role, "Peer health probe succeeded");
                self.record(true);
            }
            Ok(status) => {
                warn!(
                    peer = %self.peer_url,
                    status = %status.status,
                    store_connected = status.store_connected,
                    "Peer answered but reports itself unhealthy"
                );
                self.record(false);
            }
            Err(e) => {
                let failures = {
                    let state = self.state.read().unwrap();
                    state.consecutive_failures + 1
                };
                warn!(peer = %self.peer_url, consecutive_failures = failures, "Peer health probe failed: {e}");
                self.record(false);
            }
        }
    }

    async fn fetch_peer_health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.peer_url);
        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| SyncError::PeerUnreachable {
                    address: self.peer_url.clone(),
                    reason: e.to_string(),
                })?;

        if !response.status().is_success() {
            return Err(SyncError::PeerStatus {
                address: self.peer_url.clone(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let status: HealthStatus =
            response
                .json()
                .await
                .map_err(|e| SyncError::MalformedResponse {
                    reason: e.to_string(),
                })?;
        Ok(status)
    }

    fn record(&self, success: bool) {
        let now = self.clock.now();
        let mut state = self.state.write().unwrap();
        state.reachable = success;
        state.last_probe = Some(now);
        if success {
            state.last_success = Some(now);
            state.consecutive_failures = 0;
        } else {
            state.consecutive_failures += 1;
        }
    }
}
