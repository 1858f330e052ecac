// LLM client layer
//
// Provider trait plus the OpenAI-compatible client used for both
// Groq and OpenAI backends.

pub mod errors;
pub mod openai_compat;
pub mod provider;
pub mod types;

pub use errors::{LlmError, LlmResult};
pub use openai_compat::OpenAiCompatibleProvider;
pub use provider::LlmProvider;
pub use types::{
    LlmResponse, Message, MessageRole, ProviderConfig, ProviderKind, ToolCall, ToolDefinition,
    UsageStats,
};
