//! Streamable HTTP transport for the MCP server.
//!
//! One JSON-RPC message per `POST /mcp`. `initialize` opens a session whose
//! id travels in the `mcp-session-id` header; every later request must
//! carry it. `DELETE /mcp` ends the session. Sessions idle longer than the
//! TTL are dropped, and the oldest one is evicted when the cap is reached.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::error::McpError;
use crate::server::McpServer;
use crate::types::*;

/// Idle time after which a session is forgotten.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Upper bound on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Shared state behind the MCP router.
pub struct McpHttpState {
    server: McpServer,
    /// Session id -> last time it was used.
    sessions: RwLock<HashMap<String, Instant>>,
    session_ttl: Duration,
    max_sessions: usize,
}

impl McpHttpState {
    pub fn new(server: McpServer) -> Self {
        Self {
            server,
            sessions: RwLock::new(HashMap::new()),
            session_ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max.max(1);
        self
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Register a new session, dropping expired ones and, at the cap, the
    /// least recently used.
    async fn open_session(&self) -> String {
        let session = uuid::Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;

        let ttl = self.session_ttl;
        let before = sessions.len();
        sessions.retain(|_, last_seen| last_seen.elapsed() < ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!(expired, "Dropped idle MCP sessions");
        }

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, last_seen)| **last_seen)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            tracing::info!(session = %oldest, "Evicted MCP session at capacity");
        }

        sessions.insert(session.clone(), Instant::now());
        session
    }

    /// Refresh a live session. Expired sessions are removed and reported unknown.
    async fn touch_session(&self, session: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(last_seen) = sessions.get_mut(session) else {
            return false;
        };
        if last_seen.elapsed() < self.session_ttl {
            *last_seen = Instant::now();
            return true;
        }
        sessions.remove(session);
        tracing::info!(session = %session, "MCP session expired");
        false
    }
}

/// Create the HTTP router for MCP.
pub fn create_router(server: McpServer) -> Router {
    router_with_state(Arc::new(McpHttpState::new(server)))
}

pub fn router_with_state(state: Arc<McpHttpState>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post).delete(handle_mcp_delete))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the MCP router until the process stops.
pub async fn serve(server: McpServer, addr: &str) -> Result<(), McpError> {
    let tool_count = server.tool_count();
    let app = create_router(server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, tools = tool_count, "MCP HTTP server listening on /mcp");

    axum::serve(listener, app).await?;
    Ok(())
}

fn session_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn rpc_error_response(status: StatusCode, code: i64, message: impl Into<String>) -> Response {
    (status, Json(JsonRpcResponse::error(RpcId::Null, code, message))).into_response()
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(state): State<Arc<McpHttpState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let raw: Value = match serde_json::from_str(&body) {
        Ok(raw) => raw,
        Err(e) => {
            return rpc_error_response(
                StatusCode::BAD_REQUEST,
                error_codes::PARSE_ERROR,
                format!("Parse error: {}", e),
            )
        }
    };

    let is_initialize = raw.get("method").and_then(Value::as_str) == Some("initialize");

    if is_initialize {
        let Some(response) = state.server.handle_value(raw).await else {
            return StatusCode::ACCEPTED.into_response();
        };
        if response.error.is_some() {
            return Json(response).into_response();
        }
        let session = state.open_session().await;
        tracing::info!(session = %session, "MCP session opened");
        return ([(SESSION_HEADER, session)], Json(response)).into_response();
    }

    let Some(session) = session_of(&headers) else {
        return rpc_error_response(
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_REQUEST,
            "Missing mcp-session-id header",
        );
    };
    if !state.touch_session(&session).await {
        return rpc_error_response(
            StatusCode::NOT_FOUND,
            error_codes::INVALID_REQUEST,
            "Unknown or expired session",
        );
    }

    match state.server.handle_value(raw).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle DELETE requests to /mcp (session termination).
async fn handle_mcp_delete(
    State(state): State<Arc<McpHttpState>>,
    headers: HeaderMap,
) -> StatusCode {
    let Some(session) = session_of(&headers) else {
        return StatusCode::BAD_REQUEST;
    };
    if state.sessions.write().await.remove(&session).is_some() {
        tracing::info!(session = %session, "MCP session closed");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn handle_health(State(state): State<Arc<McpHttpState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": state.server.name(),
        "version": state.server.version(),
        "tools": state.server.tool_count(),
    }))
}
