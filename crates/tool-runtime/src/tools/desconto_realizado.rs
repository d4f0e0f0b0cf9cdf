//! Discounts already granted between a supplier and a retailer.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{pair_schema, BackingApi};
use crate::tool::{required_str, Tool, ToolDefinition, ToolError, ToolResult};

/// `GET /desconto_realizado/{fornecedor}/{varejista}`
pub struct DescontoRealizadoTool {
    api: BackingApi,
}

impl DescontoRealizadoTool {
    pub fn new(api: BackingApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for DescontoRealizadoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "desconto_realizado".to_string(),
            description: "Busca descontos já realizados entre fornecedor e varejista".to_string(),
            input_schema: pair_schema(),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let fornecedor = required_str(&input, "fornecedor")?;
        let varejista = required_str(&input, "varejista")?;
        debug!(fornecedor, varejista, "desconto_realizado");

        self.api
            .get(&["desconto_realizado", fornecedor, varejista])
            .await
    }
}
