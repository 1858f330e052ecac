use async_trait::async_trait;

use super::errors::LlmResult;
use super::types::{LlmResponse, Message, ToolDefinition};

/// Common interface for chat models used by the crew
///
/// Implementations must be safe to share between agents; the crew hands
/// every agent the same `Arc<dyn LlmProvider>`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for identification in logs
    fn name(&self) -> &str;

    /// Model the provider sends requests to
    fn model(&self) -> &str;

    /// Send the conversation and return the complete response.
    ///
    /// When `tools` is empty the model is asked for plain text.
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> LlmResult<LlmResponse>;
}
