//! Potential discounts computed for a supplier/retailer pair.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{pair_schema, BackingApi};
use crate::tool::{required_str, Tool, ToolDefinition, ToolError, ToolResult};

pub struct DescontoCalculadoTool {
    api: BackingApi,
}

impl DescontoCalculadoTool {
    pub fn new(api: BackingApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for DescontoCalculadoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "desconto_calculado".to_string(),
            description: "Calcula descontos potenciais entre fornecedor e varejista".to_string(),
            input_schema: pair_schema(),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let fornecedor = required_str(&input, "fornecedor")?;
        let varejista = required_str(&input, "varejista")?;
        debug!(fornecedor, varejista, "desconto_calculado");

        self.api
            .get(&["desconto_calculado", fornecedor, varejista])
            .await
    }
}
