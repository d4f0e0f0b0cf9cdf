//! API error type rendered as a JSON `detail` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Could not open a connection to PostgreSQL.
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// The statement failed or a row could not be decoded.
    #[error("database query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl ApiError {
    /// Message exposed to callers. The underlying error stays in the logs.
    pub fn detail(&self) -> &'static str {
        match self {
            ApiError::Connection(_) => "Erro de conexão com o banco de dados",
            ApiError::Query(_) => "Erro ao consultar o banco de dados",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": self.detail() })),
        )
            .into_response()
    }
}
