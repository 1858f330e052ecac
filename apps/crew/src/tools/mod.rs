// Tool handles available to agents
//
// Every agent receives the same read-only tool set: a directory lister
// bound to the project sources, a file reader and, when a Serper key is
// configured, a web search.

pub mod directory_read;
pub mod file_read;
pub mod web_search;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Settings;
use crate::llm::{LlmError, ToolDefinition, UsageStats};

pub use directory_read::DirectoryReadTool;
pub use file_read::FileReadTool;
pub use web_search::WebSearchTool;

/// Errors raised while invoking a tool
///
/// `Llm` is raised by tools that call the model themselves; unlike the
/// other variants it ends the agent's run.
#[derive(Debug, Error, PartialEq)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Output of a tool invocation as fed back to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub content: String,
    /// Tokens spent on model calls made by the tool
    #[serde(default)]
    pub usage: UsageStats,
}

impl ToolOutput {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            usage: UsageStats::default(),
        }
    }

    pub fn err(content: impl Into<String>) -> Self {
        Self {
            success: false,
            content: content.into(),
            usage: UsageStats::default(),
        }
    }

    pub fn with_usage(mut self, usage: UsageStats) -> Self {
        self.usage = usage;
        self
    }

    /// Text handed to the model as the tool message
    pub fn to_content(&self) -> String {
        if self.success {
            self.content.clone()
        } else {
            format!("Error: {}", self.content)
        }
    }
}

/// A capability an agent may invoke through function calling
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(&self, args: serde_json::Value) -> ToolResult<ToolOutput>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

pub type SharedTool = Arc<dyn Tool>;

/// Ordered collection of tool handles
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<SharedTool>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool; a tool with the same name replaces the earlier one
    pub fn with(mut self, tool: SharedTool) -> Self {
        self.push(tool);
        self
    }

    pub fn push(&mut self, tool: SharedTool) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&SharedTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name
    pub async fn call(&self, name: &str, args: serde_json::Value) -> ToolResult<ToolOutput> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(args).await
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Tools shared by every agent in the crew
///
/// The search tool is included only when a Serper key is configured.
/// Fails only if the search client cannot be created.
pub fn default_toolset(settings: &Settings) -> ToolResult<ToolSet> {
    let mut tools = ToolSet::new()
        .with(Arc::new(DirectoryReadTool::new(&settings.source_dir)))
        .with(Arc::new(FileReadTool::new()));

    if let Some(key) = &settings.serper_api_key {
        tools.push(Arc::new(WebSearchTool::new(key.clone())?));
    }

    Ok(tools)
}
