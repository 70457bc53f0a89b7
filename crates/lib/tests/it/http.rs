//! Status-code mapping of the HTTP surface.

use memoir::auth::LoginSuccess;
use memoir::types::NodeRole;
use reqwest::StatusCode;
use serde_json::json;

use crate::helpers::{serve, test_node};

fn login_body(secret: &str, with_location: bool) -> serde_json::Value {
    let mut body = json!({
        "username": "alice",
        "secret": secret,
        "device": {
            "device_id": "d1",
            "device_name": "test phone",
            "ip": "10.0.0.1",
        },
        "location": null,
    });
    if with_location {
        body["location"] = json!({ "lat": 51.5, "lon": -0.1, "accuracy": 15.0 });
    }
    body
}

#[tokio::test]
async fn login_status_codes_follow_the_taxonomy() {
    let t = test_node(NodeRole::Primary, "http://127.0.0.1:1");
    let (url, server) = serve(t.node.clone()).await;
    let client = reqwest::Client::new();

    // Wrong secret: 401.
    let resp = client
        .post(format!("{url}/auth/login"))
        .json(&login_body("wrong", true))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Correct secret, no location: 428, and the lock is now in place.
    let resp = client
        .post(format!("{url}/auth/login"))
        .json(&login_body("primary-secret", false))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PRECONDITION_REQUIRED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body.get("locked_until").is_some());

    // While locked, even a good login is 423 with the lock deadline.
    let resp = client
        .post(format!("{url}/auth/login"))
        .json(&login_body("primary-secret", true))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::LOCKED);

    server.abort();
}

#[tokio::test]
async fn activity_requires_a_bearer_token() {
    let t = test_node(NodeRole::Primary, "http://127.0.0.1:1");
    let (url, server) = serve(t.node.clone()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{url}/activity")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let success: LoginSuccess = client
        .post(format!("{url}/auth/login"))
        .json(&login_body("primary-secret", true))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let resp = client
        .get(format!("{url}/activity"))
        .bearer_auth(&success.session_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["recent"].as_array().unwrap().len(), 1);
    assert_eq!(body["active"].as_array().unwrap().len(), 1);

    server.abort();
}

#[tokio::test]
async fn ingest_endpoints_acknowledge_counts() {
    let t = test_node(NodeRole::Primary, "http://127.0.0.1:1");
    let (url, server) = serve(t.node.clone()).await;
    let client = reqwest::Client::new();

    let batch = json!([{
        "username": "alice",
        "device_id": "d9",
        "device_name": "tablet",
        "ip": "10.0.0.2",
        "location": null,
        "login_time": "2024-01-01T00:00:00Z",
        "logout_time": "2024-01-01T01:00:00Z",
        "is_active": false,
        "is_suspicious": false,
    }]);

    for _ in 0..2 {
        let resp = client
            .post(format!("{url}/sync/sessions"))
            .json(&batch)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["synced"], 1);
    }

    // Re-submitting the identical batch left exactly one record.
    use memoir::store::NodeStore;
    assert_eq!(t.store.recent_sessions(10).unwrap().len(), 1);

    let resp = client
        .get(format!("{url}/health"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["role"], "primary");
    assert_eq!(body["store_connected"], true);

    server.abort();
}
