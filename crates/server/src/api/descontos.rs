//! Discount lookups: one SELECT per request, rows passed through as JSON.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

pub const NO_DESCONTO_REALIZADO: &str = "Nenhum desconto encontrado para este par.";
pub const NO_DESCONTO_CALCULADO: &str = "Nenhum cálculo encontrado para este par.";
pub const NO_ORGANIZACAO: &str = "Nenhuma organização cadastrada.";

/// `{"data": rows}`, or `{"message": ..., "data": []}` when nothing matched.
#[derive(Debug, Serialize)]
pub struct RowsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: Vec<Value>,
}

impl RowsResponse {
    fn from_rows(rows: Vec<Value>, empty_message: &'static str) -> Self {
        Self {
            message: rows.is_empty().then_some(empty_message),
            data: rows,
        }
    }
}

pub async fn desconto_realizado(
    State(state): State<Arc<AppState>>,
    Path((fornecedor, varejista)): Path<(String, String)>,
) -> Result<Json<RowsResponse>, ApiError> {
    let rows = state
        .store
        .descontos_realizados(&fornecedor, &varejista)
        .await?;
    tracing::debug!(%fornecedor, %varejista, rows = rows.len(), "desconto_realizado");
    Ok(Json(RowsResponse::from_rows(rows, NO_DESCONTO_REALIZADO)))
}

pub async fn desconto_calculado(
    State(state): State<Arc<AppState>>,
    Path((fornecedor, varejista)): Path<(String, String)>,
) -> Result<Json<RowsResponse>, ApiError> {
    let rows = state
        .store
        .descontos_calculados(&fornecedor, &varejista)
        .await?;
    tracing::debug!(%fornecedor, %varejista, rows = rows.len(), "desconto_calculado");
    Ok(Json(RowsResponse::from_rows(rows, NO_DESCONTO_CALCULADO)))
}

pub async fn tabela_de_variaveis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RowsResponse>, ApiError> {
    let rows = state.store.organization_mappings().await?;
    Ok(Json(RowsResponse::from_rows(rows, NO_ORGANIZACAO)))
}
