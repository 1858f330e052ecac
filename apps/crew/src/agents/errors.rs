use thiserror::Error;
use uuid::Uuid;

use super::types::Process;
use crate::llm::LlmError;

/// Errors that can occur while assembling or running a crew
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM API error: {0}")]
    Llm(#[from] LlmError),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Task {task} has invalid context: {reason}")]
    InvalidContext { task: Uuid, reason: String },

    #[error("Unsupported process: {0}")]
    UnsupportedProcess(Process),

    #[error("Agent '{0}' returned an empty answer")]
    EmptyResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
