//! HTTP surface of a node.
//!
//! Client endpoints (login, logout, block lists, activity, diary), the
//! node-to-node ingest endpoints, the operator recovery pull, and the health
//! endpoint, all as JSON routes over axum. Transport concerns beyond JSON
//! framing (CORS, TLS) are out of scope here.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Json as ExtractJson, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ActivityListing, Node};
use crate::auth::{AuthError, LoginAttempt, LoginSuccess};
use crate::constants::RECENT_ACTIVITY_LIMIT;
use crate::sync::protocol::{BackupSnapshot, DiaryBatch, SessionBatch, SyncCount};
use crate::sync::{pull_backup_data, upsert_diary_batch, upsert_session_batch};
use crate::types::DiaryEntry;

/// Build the router for a node. Every route shares the node as state.
///
/// The recovery pull is only mounted when the node's configuration serves
/// it; on the other role the path does not exist and answers 404.
pub fn router(node: Arc<Node>) -> Router {
    let mut router = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/acl/block-ip", post(block_ip))
        .route("/acl/block-device", post(block_device))
        .route("/activity", get(activity))
        .route("/diary", post(create_entry).get(list_entries))
        .route("/sync/diary", post(sync_diary))
        .route("/sync/sessions", post(sync_sessions))
        .route("/health", get(health));
    if node.serves_recovery() {
        router = router.route("/sync/pull", get(sync_pull));
    }
    router.with_state(node)
}

/// Error wrapper mapping the library taxonomy onto HTTP statuses.
///
/// `InvalidCredentials` and `InvalidToken` map to 401, `AccountLocked` to
/// 423, `LocationRequired` to 428. Store failures surface as a generic 500
/// with no internal detail.
struct ApiError(crate::Error);

impl From<crate::Error> for ApiError {
    fn from(e: crate::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            crate::Error::Auth(AuthError::InvalidCredentials)
            | crate::Error::Auth(AuthError::InvalidToken) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": self.0.to_string() }),
            ),
            crate::Error::Auth(AuthError::AccountLocked { until }) => (
                StatusCode::LOCKED,
                json!({ "error": self.0.to_string(), "locked_until": until }),
            ),
            crate::Error::Auth(AuthError::LocationRequired { locked_until }) => (
                StatusCode::PRECONDITION_REQUIRED,
                json!({ "error": self.0.to_string(), "locked_until": locked_until }),
            ),
            e if e.is_not_found() => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.0.to_string() }),
            ),
            _ => {
                tracing::error!("Request failed: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError(AuthError::InvalidToken.into()))
}

async fn login(
    State(node): State<Arc<Node>>,
    ExtractJson(attempt): ExtractJson<LoginAttempt>,
) -> Result<Json<LoginSuccess>, ApiError> {
    Ok(Json(node.login(attempt)?))
}

#[derive(Deserialize)]
struct LogoutRequest {
    device_id: String,
}

#[derive(Serialize)]
struct LogoutResponse {
    closed: usize,
}

async fn logout(
    State(node): State<Arc<Node>>,
    ExtractJson(req): ExtractJson<LogoutRequest>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let closed = node.logout_device(&req.device_id)?;
    Ok(Json(LogoutResponse { closed }))
}

#[derive(Deserialize)]
struct BlockIpRequest {
    username: String,
    ip: String,
}

async fn block_ip(
    State(node): State<Arc<Node>>,
    ExtractJson(req): ExtractJson<BlockIpRequest>,
) -> Result<StatusCode, ApiError> {
    node.block_ip(&req.username, &req.ip)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct BlockDeviceRequest {
    username: String,
    device_id: String,
}

async fn block_device(
    State(node): State<Arc<Node>>,
    ExtractJson(req): ExtractJson<BlockDeviceRequest>,
) -> Result<StatusCode, ApiError> {
    node.block_device(&req.username, &req.device_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn activity(
    State(node): State<Arc<Node>>,
    headers: HeaderMap,
) -> Result<Json<ActivityListing>, ApiError> {
    let token = bearer_token(&headers)?;
    Ok(Json(node.activity(token)?))
}

#[derive(Deserialize)]
struct NewEntryRequest {
    title: String,
    content: String,
    #[serde(default)]
    tags: std::collections::BTreeSet<String>,
}

async fn create_entry(
    State(node): State<Arc<Node>>,
    headers: HeaderMap,
    ExtractJson(req): ExtractJson<NewEntryRequest>,
) -> Result<Json<DiaryEntry>, ApiError> {
    let token = bearer_token(&headers)?;
    Ok(Json(node.create_entry(
        token,
        req.title,
        req.content,
        req.tags,
    )?))
}

async fn list_entries(
    State(node): State<Arc<Node>>,
    headers: HeaderMap,
) -> Result<Json<Vec<DiaryEntry>>, ApiError> {
    let token = bearer_token(&headers)?;
    Ok(Json(node.list_entries(token, RECENT_ACTIVITY_LIMIT)?))
}

async fn sync_diary(
    State(node): State<Arc<Node>>,
    ExtractJson(batch): ExtractJson<DiaryBatch>,
) -> Result<Json<SyncCount>, ApiError> {
    Ok(Json(upsert_diary_batch(node.store().as_ref(), batch)?))
}

async fn sync_sessions(
    State(node): State<Arc<Node>>,
    ExtractJson(batch): ExtractJson<SessionBatch>,
) -> Result<Json<SyncCount>, ApiError> {
    Ok(Json(upsert_session_batch(node.store().as_ref(), batch)?))
}

async fn sync_pull(State(node): State<Arc<Node>>) -> Result<Json<BackupSnapshot>, ApiError> {
    Ok(Json(pull_backup_data(node.store().as_ref())?))
}

async fn health(State(node): State<Arc<Node>>) -> Json<crate::sync::protocol::HealthStatus> {
    Json(node.health_status())
}
