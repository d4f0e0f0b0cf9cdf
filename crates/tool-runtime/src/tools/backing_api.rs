use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::tool::{ToolError, ToolResult};

/// HTTP client bound to the backing API's base URL.
///
/// Cheap to clone; all tools share one connection pool.
#[derive(Debug, Clone)]
pub struct BackingApi {
    client: Client,
    base_url: Url,
}

impl BackingApi {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL. Each value is percent-encoded
    /// as a single segment, so `/` inside a value never adds a level.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ToolError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ToolError::ExecutionFailed(format!("base URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue one GET and return the body as text.
    ///
    /// Non-2xx responses are not errors: they come back as
    /// `Erro HTTP {status}: {body}` flagged with `is_error`.
    pub async fn get(&self, segments: &[&str]) -> Result<ToolResult, ToolError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET backing API");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("reading body from {} failed: {}", url, e)))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Backing API returned an error status");
            return Ok(ToolResult::error(format!("Erro HTTP {}: {}", status.as_u16(), body)));
        }

        Ok(ToolResult::text(body))
    }
}
