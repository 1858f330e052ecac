//! OpenAI-compatible chat-completions provider
//!
//! Groq and OpenAI expose the same `/chat/completions` wire format, so one
//! client serves both; only the base URL and the default model differ.

use async_trait::async_trait;
use serde::Deserialize;

use super::errors::{missing_api_key_error, parse_http_error, LlmError, LlmResult};
use super::provider::LlmProvider;
use super::types::{
    LlmResponse, Message, MessageRole, ProviderConfig, ToolCall, ToolDefinition, UsageStats,
};

/// Chat-completions client for any OpenAI-compatible endpoint
pub struct OpenAiCompatibleProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Other {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Build the JSON request body
    pub(crate) fn build_request_body(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> serde_json::Value {
        let wire_messages: Vec<serde_json::Value> =
            messages.iter().map(message_to_wire).collect();

        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": wire_messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        if !tools.is_empty() {
            let wire_tools: Vec<serde_json::Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = serde_json::json!(wire_tools);
            body["tool_choice"] = serde_json::json!("auto");
        }

        body
    }

    async fn send_once(&self, api_key: &str, body: &serde_json::Value) -> LlmResult<LlmResponse> {
        let provider = self.config.provider.as_str();

        let response = self
            .client
            .post(self.config.base_url())
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body_text, provider));
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: e.to_string(),
            })?;

        Ok(parse_response(parsed))
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        self.config.provider.as_str()
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> LlmResult<LlmResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| missing_api_key_error(self.name()))?;

        let body = self.build_request_body(messages, tools);
        let mut attempt = 0;

        loop {
            match self.send_once(api_key, &body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_delay * 2u32.pow(attempt);
                    attempt += 1;
                    tracing::warn!(
                        provider = self.name(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient LLM error, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn message_to_wire(message: &Message) -> serde_json::Value {
    match message.role {
        MessageRole::Tool => serde_json::json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id,
            "content": message.content.clone().unwrap_or_default(),
        }),
        MessageRole::Assistant if !message.tool_calls.is_empty() => {
            let tool_calls: Vec<serde_json::Value> = message
                .tool_calls
                .iter()
                .map(|tc| {
                    serde_json::json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            "arguments": wire_arguments(&tc.arguments),
                        }
                    })
                })
                .collect();

            // Some compatible APIs reject a missing content field
            serde_json::json!({
                "role": "assistant",
                "content": message.content,
                "tool_calls": tool_calls,
            })
        }
        role => serde_json::json!({
            "role": role,
            "content": message.content.clone().unwrap_or_default(),
        }),
    }
}

/// Arguments travel as a JSON-encoded string; unparseable text is kept as-is
fn wire_arguments(arguments: &serde_json::Value) -> String {
    match arguments {
        serde_json::Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

fn parse_response(response: ChatCompletionResponse) -> LlmResponse {
    let mut content = None;
    let mut tool_calls = Vec::new();

    if let Some(message) = response.choices.into_iter().next().and_then(|c| c.message) {
        content = message.content.filter(|c| !c.trim().is_empty());

        for tc in message.tool_calls.unwrap_or_default() {
            // Keep the raw text if it does not parse
            let arguments = serde_json::from_str(&tc.function.arguments)
                .unwrap_or(serde_json::Value::String(tc.function.arguments));
            tool_calls.push(ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments,
            });
        }
    }

    let usage = response
        .usage
        .map(|u| UsageStats {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    LlmResponse {
        content,
        tool_calls,
        usage,
        model: response.model,
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}
