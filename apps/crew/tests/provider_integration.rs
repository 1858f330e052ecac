//! OpenAI-compatible provider tests against a mock HTTP server

use std::time::Duration;

use engineering_crew::llm::{
    LlmError, LlmProvider, Message, OpenAiCompatibleProvider, ProviderConfig, ProviderKind,
    ToolDefinition,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer, kind: ProviderKind, model: &str) -> OpenAiCompatibleProvider {
    let config = ProviderConfig::new(kind, Some("test-key".to_string()), model)
        .with_base_url(format!("{}/v1/chat/completions", server.uri()))
        .with_retries(2, Duration::from_millis(10));
    OpenAiCompatibleProvider::new(config).expect("client builds")
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "llama3-70b-8192",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 21, "completion_tokens": 7, "total_tokens": 28}
    })
}

#[tokio::test]
async fn test_chat_sends_model_auth_and_tools() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "llama3-70b-8192",
            "tool_choice": "auto"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello from Groq")))
        .expect(1)
        .mount(&server)
        .await;

    let llm = provider(&server, ProviderKind::Groq, "llama3-70b-8192");
    let tools = vec![ToolDefinition {
        name: "read_file".to_string(),
        description: "Read a file".to_string(),
        parameters: json!({"type": "object"}),
    }];

    let response = llm.chat(&[Message::user("hi")], &tools).await.unwrap();

    assert_eq!(response.content.as_deref(), Some("Hello from Groq"));
    assert_eq!(response.usage.prompt_tokens, 21);
    assert_eq!(response.usage.completion_tokens, 7);
    assert_eq!(llm.name(), "groq");
}

#[tokio::test]
async fn test_parses_tool_call_arguments() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4-turbo",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "read_file",
                            "arguments": "{\"file_path\":\"src/App.ts\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .mount(&server)
        .await;

    let llm = provider(&server, ProviderKind::OpenAi, "gpt-4-turbo");
    let response = llm.chat(&[Message::user("read it")], &[]).await.unwrap();

    assert!(response.content.is_none());
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].id, "call_abc");
    assert_eq!(response.tool_calls[0].arguments["file_path"], "src/App.ts");
}

#[tokio::test]
async fn test_retries_rate_limit_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("after retry")))
        .expect(1)
        .mount(&server)
        .await;

    let llm = provider(&server, ProviderKind::Groq, "llama3-70b-8192");
    let response = llm.chat(&[Message::user("hi")], &[]).await.unwrap();

    assert_eq!(response.content.as_deref(), Some("after retry"));
}

#[tokio::test]
async fn test_gives_up_after_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(3)
        .mount(&server)
        .await;

    let llm = provider(&server, ProviderKind::OpenAi, "gpt-4-turbo");
    let err = llm.chat(&[Message::user("hi")], &[]).await.unwrap_err();

    assert!(matches!(err, LlmError::ServerError { status: 503, .. }));
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let llm = provider(&server, ProviderKind::OpenAi, "gpt-4-turbo");
    let err = llm.chat(&[Message::user("hi")], &[]).await.unwrap_err();

    match err {
        LlmError::AuthenticationFailed { message } => assert!(message.contains("openai")),
        other => panic!("Expected AuthenticationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let llm = provider(&server, ProviderKind::Groq, "llama3-70b-8192");
    let err = llm.chat(&[Message::user("hi")], &[]).await.unwrap_err();

    assert!(matches!(err, LlmError::ParseError { .. }));
}
