//! Unit tests for the OpenAI tool provider.

use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use descontos_tool_runtime::conversation::{AssistantContent, ConversationMessage};
use descontos_tool_runtime::provider::{CompletionOptions, LlmError, ToolAwareLlmProvider};
use descontos_tool_runtime::tool::{ToolCall, ToolDefinition, ToolResult};

use super::translate::{message_to_openai, parse_completion, tool_definition_to_openai};
use super::OpenAiToolProvider;

fn pair_tool() -> ToolDefinition {
    ToolDefinition {
        name: "desconto_realizado".to_string(),
        description: "Busca descontos já realizados entre fornecedor e varejista".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "fornecedor": { "type": "string" },
                "varejista": { "type": "string" }
            },
            "required": ["fornecedor", "varejista"]
        }),
    }
}

#[test]
fn test_tool_definition_translation() {
    let openai_json = tool_definition_to_openai(&pair_tool());

    assert_eq!(openai_json["type"], "function");
    assert_eq!(openai_json["function"]["name"], "desconto_realizado");
    assert_eq!(openai_json["function"]["parameters"]["required"][1], "varejista");
}

#[test]
fn test_system_and_user_translation() {
    let system = message_to_openai(&ConversationMessage::System("Você é um assistente".into()));
    assert_eq!(system, json!({"role": "system", "content": "Você é um assistente"}));

    let user = message_to_openai(&ConversationMessage::User("oi".into()));
    assert_eq!(user, json!({"role": "user", "content": "oi"}));
}

#[test]
fn test_assistant_tool_call_translation() {
    let msg = ConversationMessage::Assistant(AssistantContent {
        text: None,
        tool_calls: vec![ToolCall {
            id: "call_abc".to_string(),
            name: "desconto_realizado".to_string(),
            input: json!({"fornecedor": "A", "varejista": "B"}),
        }],
    });
    let openai_json = message_to_openai(&msg);

    assert_eq!(openai_json["role"], "assistant");
    assert!(openai_json["content"].is_null());
    let call = &openai_json["tool_calls"][0];
    assert_eq!(call["id"], "call_abc");
    assert_eq!(call["type"], "function");
    let arguments: Value =
        serde_json::from_str(call["function"]["arguments"].as_str().unwrap()).unwrap();
    assert_eq!(arguments, json!({"fornecedor": "A", "varejista": "B"}));
}

#[test]
fn test_assistant_text_has_no_tool_calls_key() {
    let msg = ConversationMessage::Assistant(AssistantContent::from_text("Pronto."));
    let openai_json = message_to_openai(&msg);
    assert_eq!(openai_json["content"], "Pronto.");
    assert!(openai_json.get("tool_calls").is_none());
}

#[test]
fn test_tool_result_translation() {
    let msg = ConversationMessage::ToolResult(ToolResult {
        tool_call_id: "call_abc".to_string(),
        content: r#"{"data":[]}"#.to_string(),
        is_error: false,
    });
    let openai_json = message_to_openai(&msg);
    assert_eq!(openai_json["role"], "tool");
    assert_eq!(openai_json["tool_call_id"], "call_abc");
    assert_eq!(openai_json["content"], r#"{"data":[]}"#);
}

#[test]
fn test_parse_text_completion() {
    let resp = json!({
        "choices": [{ "message": { "role": "assistant", "content": "Olá!" } }]
    });
    let content = parse_completion(&resp).unwrap();
    assert_eq!(content.text.as_deref(), Some("Olá!"));
    assert!(content.tool_calls.is_empty());
}

#[test]
fn test_parse_tool_call_completion() {
    let resp = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    {
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "desconto_realizado",
                            "arguments": "{\"fornecedor\":\"A\",\"varejista\":\"B\"}"
                        }
                    },
                    {
                        "id": "call_2",
                        "type": "function",
                        "function": { "name": "tabela_variaveis", "arguments": "" }
                    }
                ]
            }
        }]
    });
    let content = parse_completion(&resp).unwrap();
    assert!(content.text.is_none());
    assert_eq!(content.tool_calls.len(), 2);
    assert_eq!(content.tool_calls[0].input["varejista"], "B");
    assert_eq!(content.tool_calls[1].name, "tabela_variaveis");
    assert_eq!(content.tool_calls[1].input, json!({}));
}

#[test]
fn test_parse_rejects_bad_arguments() {
    let resp = json!({
        "choices": [{ "message": { "tool_calls": [{
            "id": "call_1",
            "function": { "name": "desconto_realizado", "arguments": "{not json" }
        }]}}]
    });
    assert!(matches!(parse_completion(&resp), Err(LlmError::InvalidResponse(_))));
    assert!(matches!(parse_completion(&json!({})), Err(LlmError::InvalidResponse(_))));
}

#[test]
fn test_request_body_with_and_without_tools() {
    let provider = OpenAiToolProvider::new("sk".into(), "gpt-4o-mini".into(), "http://x/".into());
    let messages = vec![ConversationMessage::User("oi".into())];

    let first = provider.request_body(&messages, &[pair_tool()], &CompletionOptions::default());
    assert_eq!(first["model"], "gpt-4o-mini");
    assert_eq!(first["max_tokens"], 2000);
    assert_eq!(first["tool_choice"], "auto");
    assert_eq!(first["tools"].as_array().unwrap().len(), 1);

    let last = provider.request_body(
        &messages,
        &[],
        &CompletionOptions { temperature: 0.1, max_tokens: None },
    );
    assert!(last.get("tools").is_none());
    assert!(last.get("tool_choice").is_none());
    assert!(last.get("max_tokens").is_none());
}

#[test]
fn test_completions_url_accepts_v1_suffix() {
    let url = |base: &str| {
        OpenAiToolProvider::new("sk".into(), "gpt-4o-mini".into(), base.into()).completions_url()
    };
    assert_eq!(url("https://api.openai.com"), "https://api.openai.com/v1/chat/completions");
    assert_eq!(url("https://api.openai.com/"), "https://api.openai.com/v1/chat/completions");
    assert_eq!(url("https://api.openai.com/v1"), "https://api.openai.com/v1/chat/completions");
    assert_eq!(url("http://localhost:11434/v1/"), "http://localhost:11434/v1/chat/completions");
}

#[tokio::test]
async fn test_base_url_with_v1_reaches_endpoint() {
    let (base, seen) = spawn_completions(
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": "ok"}}]}),
    )
    .await;
    let provider =
        OpenAiToolProvider::new("sk".into(), "gpt-4o-mini".into(), format!("{}/v1", base));

    let content = provider
        .complete_with_tools(vec![], vec![], &CompletionOptions::default())
        .await
        .unwrap();
    assert_eq!(content.text.as_deref(), Some("ok"));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

async fn spawn_completions(status: StatusCode, reply: Value) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let recorded = recorded.clone();
            let reply = reply.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                recorded.lock().unwrap().push((auth, body));
                (status, Json(reply))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), seen)
}

#[tokio::test]
async fn test_complete_with_tools_over_http() {
    let (base, seen) = spawn_completions(
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": "Tudo certo."}}]}),
    )
    .await;
    let provider = OpenAiToolProvider::new("sk-test".into(), "gpt-4o-mini".into(), base);

    let content = provider
        .complete_with_tools(
            vec![
                ConversationMessage::System("sys".into()),
                ConversationMessage::User("oi".into()),
            ],
            vec![pair_tool()],
            &CompletionOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(content.text.as_deref(), Some("Tudo certo."));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "Bearer sk-test");
    assert_eq!(seen[0].1["messages"].as_array().unwrap().len(), 2);
    assert_eq!(seen[0].1["tools"][0]["function"]["name"], "desconto_realizado");
}

#[tokio::test]
async fn test_error_status_maps_to_api_error() {
    let (base, _seen) = spawn_completions(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"message": "Incorrect API key provided"}}),
    )
    .await;
    let provider = OpenAiToolProvider::new("bad".into(), "gpt-4o-mini".into(), base);

    let err = provider
        .complete_with_tools(vec![], vec![], &CompletionOptions::default())
        .await
        .unwrap_err();
    match err {
        LlmError::ApiError { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("Incorrect API key"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}
