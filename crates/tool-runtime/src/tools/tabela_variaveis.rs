use async_trait::async_trait;
use serde_json::Value;

use super::BackingApi;
use crate::tool::{Tool, ToolDefinition, ToolError, ToolResult};

/// Full organization → variable mapping table. Takes no arguments.
pub struct TabelaVariaveisTool {
    api: BackingApi,
}

impl TabelaVariaveisTool {
    pub fn new(api: BackingApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for TabelaVariaveisTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "tabela_variaveis".to_string(),
            description: "Retorna a tabela completa de variáveis".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    async fn execute(&self, _input: Value) -> Result<ToolResult, ToolError> {
        self.api.get(&["tabelaDeVariaveis"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::spawn_api;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_ignores_arguments() {
        let body = r#"{"data":[{"organizacao":"ACME","variavel":"VAR_ACME"}]}"#;
        let (base, hits) = spawn_api(StatusCode::OK, body).await;
        let tool = TabelaVariaveisTool::new(BackingApi::new(&base).unwrap());

        let result = tool.execute(serde_json::json!({"extra": true})).await.unwrap();
        assert_eq!(result.content, body);
        assert_eq!(*hits.lock().unwrap(), vec!["/tabelaDeVariaveis".to_string()]);
    }
}
