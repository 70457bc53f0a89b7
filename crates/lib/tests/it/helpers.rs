//! Shared fixtures for the integration suite.

use std::sync::Arc;

use memoir::auth::LoginAttempt;
use memoir::clock::FixedClock;
use memoir::node::{Node, NodeConfig, http};
use memoir::store::InMemory;
use memoir::types::{DeviceInfo, GeoPoint, NodeRole};
use tokio::task::JoinHandle;

/// A node with its store and controllable clock.
pub struct TestNode {
    pub node: Arc<Node>,
    pub store: Arc<InMemory>,
    pub clock: Arc<FixedClock>,
}

/// Build a node pointed at `peer_url`, with "alice" provisioned.
pub fn test_node(role: NodeRole, peer_url: &str) -> TestNode {
    let store = Arc::new(InMemory::new());
    let clock = Arc::new(FixedClock::default());
    let node = Arc::new(Node::new(
        NodeConfig::new(role, peer_url),
        store.clone(),
        clock.clone(),
    ));
    node.register_user("alice", "primary-secret", "backup-secret")
        .unwrap();
    TestNode { node, store, clock }
}

/// Serve a node on an ephemeral port. Returns its base URL and the server
/// task handle; abort the handle to stop the server.
pub async fn serve(node: Arc<Node>) -> (String, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = http::router(node);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), handle)
}

pub fn device(device_id: &str, ip: &str) -> DeviceInfo {
    DeviceInfo {
        device_id: device_id.to_string(),
        device_name: "test phone".to_string(),
        ip: ip.to_string(),
    }
}

pub fn here() -> GeoPoint {
    GeoPoint {
        lat: 51.5074,
        lon: -0.1278,
        accuracy: 15.0,
    }
}

pub fn attempt(secret: &str, use_backup: bool, location: Option<GeoPoint>) -> LoginAttempt {
    LoginAttempt {
        username: "alice".to_string(),
        secret: secret.to_string(),
        use_backup,
        device: device("d1", "10.0.0.1"),
        location,
    }
}
