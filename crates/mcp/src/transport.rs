//! MCP transport layer.
//!
//! Defines the `McpTransport` trait for sending/receiving JSON-RPC messages.
//! `HttpClientTransport` speaks the streamable HTTP transport used by
//! `descontos-mcp-server`; `ChannelTransport` connects two peers in memory.

use std::collections::VecDeque;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::McpError;
use crate::types::SESSION_HEADER;

/// Trait for MCP message transport.
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Next JSON-RPC message from the peer.
    /// Returns `None` when nothing more will arrive.
    async fn receive(&mut self) -> Result<Option<String>, McpError>;

    /// Send one JSON-RPC message.
    async fn send(&mut self, message: &str) -> Result<(), McpError>;

    /// Release the connection. Default: nothing to release.
    async fn close(&mut self) -> Result<(), McpError> {
        Ok(())
    }
}

/// Client side of the streamable HTTP transport.
///
/// Every `send` is a `POST` to the endpoint; whatever the server answers
/// (a JSON body or an SSE stream of `data:` events) is queued and handed
/// out by `receive`. The session id issued on `initialize` is replayed on
/// every later request and released with `DELETE` on `close`.
pub struct HttpClientTransport {
    client: reqwest::Client,
    endpoint: String,
    session_id: Option<String>,
    inbox: VecDeque<String>,
}

impl HttpClientTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            session_id: None,
            inbox: VecDeque::new(),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

#[async_trait]
impl McpTransport for HttpClientTransport {
    async fn receive(&mut self) -> Result<Option<String>, McpError> {
        Ok(self.inbox.pop_front())
    }

    async fn send(&mut self, message: &str) -> Result<(), McpError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json, text/event-stream")
            .body(message.to_string());
        if let Some(session) = &self.session_id {
            request = request.header(SESSION_HEADER, session.as_str());
        }

        let response = request.send().await?;

        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            if self.session_id.as_deref() != Some(session) {
                debug!(session = %session, "MCP session assigned");
                self.session_id = Some(session.to_string());
            }
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND && self.session_id.is_some() {
            return Err(McpError::SessionExpired);
        }
        if status == StatusCode::ACCEPTED {
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Transport(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));
        let body = response.text().await?;

        if is_event_stream {
            self.inbox.extend(sse_data_events(&body));
        } else if !body.trim().is_empty() {
            self.inbox.push_back(body);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), McpError> {
        let Some(session) = self.session_id.take() else {
            return Ok(());
        };
        let response = self
            .client
            .delete(&self.endpoint)
            .header(SESSION_HEADER, session.as_str())
            .send()
            .await?;
        // Servers may refuse explicit termination (405); the session then just expires.
        debug!(status = response.status().as_u16(), "MCP session closed");
        Ok(())
    }
}

/// Collect the `data:` payload of each event in an SSE body.
fn sse_data_events(body: &str) -> Vec<String> {
    let mut events = Vec::new();
    let mut data: Vec<&str> = Vec::new();
    for line in body.lines() {
        if line.is_empty() {
            if !data.is_empty() {
                events.push(data.join("\n"));
                data.clear();
            }
        } else if let Some(rest) = line.strip_prefix("data:") {
            data.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if !data.is_empty() {
        events.push(data.join("\n"));
    }
    events
}

/// In-memory transport backed by channel pairs.
pub struct ChannelTransport {
    rx: tokio::sync::mpsc::Receiver<String>,
    tx: tokio::sync::mpsc::Sender<String>,
}

impl ChannelTransport {
    /// Create a pair of connected transports.
    ///
    /// Messages sent on one transport are received by the other.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = tokio::sync::mpsc::channel(32);
        let (tx_b, rx_a) = tokio::sync::mpsc::channel(32);
        (
            Self { rx: rx_a, tx: tx_a },
            Self { rx: rx_b, tx: tx_b },
        )
    }
}

#[async_trait]
impl McpTransport for ChannelTransport {
    async fn receive(&mut self) -> Result<Option<String>, McpError> {
        Ok(self.rx.recv().await)
    }

    async fn send(&mut self, message: &str) -> Result<(), McpError> {
        self.tx
            .send(message.to_string())
            .await
            .map_err(|e| McpError::Transport(format!("peer closed: {}", e)))
    }
}
