//! Tools backed by the descontos REST API.
//!
//! Each tool issues exactly one `GET` against the backing API and hands the
//! response body back as text.

pub mod backing_api;
pub mod desconto_calculado;
pub mod desconto_realizado;
pub mod tabela_variaveis;

pub use backing_api::BackingApi;
pub use desconto_calculado::DescontoCalculadoTool;
pub use desconto_realizado::DescontoRealizadoTool;
pub use tabela_variaveis::TabelaVariaveisTool;

use serde_json::Value;

use crate::registry::{RegistryError, ToolRegistry};

/// Build the fixed catalogue: `desconto_realizado`, `desconto_calculado`,
/// `tabela_variaveis`, in that order.
pub fn desconto_registry(api: BackingApi) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(DescontoRealizadoTool::new(api.clone()))?;
    registry.register(DescontoCalculadoTool::new(api.clone()))?;
    registry.register(TabelaVariaveisTool::new(api))?;
    Ok(registry)
}

/// Input schema shared by the two supplier/retailer lookups.
pub(crate) fn pair_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "fornecedor": {
                "type": "string",
                "description": "Nome do fornecedor"
            },
            "varejista": {
                "type": "string",
                "description": "Nome do varejista"
            }
        },
        "required": ["fornecedor", "varejista"]
    })
}
