use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm::{
    LlmError, LlmProvider, LlmResponse, LlmResult, Message, ToolCall, ToolDefinition, UsageStats,
};

/// Provider that replays canned responses and records every request
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<LlmResponse>>,
    requests: Mutex<Vec<(Vec<Message>, Vec<String>)>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<LlmResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> Vec<Message> {
        self.requests.lock().unwrap()[index].0.clone()
    }

    pub fn tools_offered(&self, index: usize) -> Vec<String> {
        self.requests.lock().unwrap()[index].1.clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> LlmResult<LlmResponse> {
        self.requests.lock().unwrap().push((
            messages.to_vec(),
            tools.iter().map(|t| t.name.clone()).collect(),
        ));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::Other {
                message: "script exhausted".to_string(),
            })
    }
}

pub fn text(content: &str) -> LlmResponse {
    LlmResponse {
        content: Some(content.to_string()),
        tool_calls: vec![],
        usage: UsageStats {
            prompt_tokens: 10,
            completion_tokens: 5,
        },
        model: "scripted".to_string(),
    }
}

pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> LlmResponse {
    LlmResponse {
        content: None,
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }],
        usage: UsageStats {
            prompt_tokens: 10,
            completion_tokens: 2,
        },
        model: "scripted".to_string(),
    }
}
