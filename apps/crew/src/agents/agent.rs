use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::errors::{AgentError, AgentResult};
use super::events::{CrewEvent, EventSink};
use super::prompts::{context_section, library};
use super::task::Task;
use super::types::AgentRun;
use crate::llm::{LlmProvider, Message, ToolCall, UsageStats};
use crate::tools::{ToolError, ToolOutput, ToolSet};

/// Default number of model turns that may request tools before a final answer is forced
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// A role-playing agent backed by an LLM
///
/// The persona (role, goal, backstory) becomes the system prompt; tasks
/// are executed through a tool-calling loop against `llm`.
#[derive(Clone)]
pub struct Agent {
    pub id: Uuid,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub allow_delegation: bool,
    pub verbose: bool,
    pub max_iterations: usize,
    tools: ToolSet,
    llm: Arc<dyn LlmProvider>,
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            allow_delegation: false,
            verbose: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tools: ToolSet::new(),
            llm,
        }
    }

    pub fn with_tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    pub fn allow_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Case-insensitive role comparison used for task assignment and delegation
    pub fn has_role(&self, role: &str) -> bool {
        self.role.trim().eq_ignore_ascii_case(role.trim())
    }

    /// Build the system and user messages for a task
    pub fn task_messages(&self, task: &Task, context: Option<&str>) -> Vec<Message> {
        let template = library::task_execution();
        let context = context_section(context);
        let vars = HashMap::from([
            ("role", self.role.as_str()),
            ("goal", self.goal.as_str()),
            ("backstory", self.backstory.as_str()),
            ("description", task.description.as_str()),
            ("expected_output", task.expected_output.as_str()),
            ("context", context.as_str()),
        ]);

        vec![
            Message::system(template.render_system(&vars)),
            Message::user(template.render(&vars)),
        ]
    }

    /// Execute a task with `tools` available
    ///
    /// The model is called repeatedly; every requested tool is run and its
    /// result appended to the conversation. The first reply without tool
    /// calls is the answer. After `max_iterations` tool rounds the model is
    /// asked for a final answer with tools withheld.
    pub async fn execute_task(
        &self,
        task: &Task,
        context: Option<&str>,
        tools: &ToolSet,
        events: &EventSink,
    ) -> AgentResult<AgentRun> {
        let mut messages = self.task_messages(task, context);
        let definitions = tools.definitions();
        let mut usage = UsageStats::default();

        tracing::debug!(
            agent = %self.role,
            task = %task.label(),
            tools = ?tools.names(),
            "Executing task"
        );

        for iteration in 1..=self.max_iterations {
            let response = self.llm.chat(&messages, &definitions).await?;
            usage.add(response.usage);

            if !response.has_tool_calls() {
                let raw = self.final_answer(response.content)?;
                return Ok(AgentRun {
                    raw,
                    usage,
                    iterations: iteration,
                });
            }

            messages.push(Message::assistant_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let output = self.run_tool(call, tools, events).await?;
                usage.add(output.usage);
                messages.push(Message::tool_result(&call.id, output.to_content()));
            }
        }

        tracing::warn!(
            agent = %self.role,
            max_iterations = self.max_iterations,
            "Tool-call budget exhausted, forcing final answer"
        );

        let vars = HashMap::new();
        messages.push(Message::user(library::force_final_answer().render(&vars)));
        let response = self.llm.chat(&messages, &[]).await?;
        usage.add(response.usage);

        Ok(AgentRun {
            raw: self.final_answer(response.content)?,
            usage,
            iterations: self.max_iterations + 1,
        })
    }

    /// Run one tool call; failures become error output for the model,
    /// except model errors, which end the run
    async fn run_tool(
        &self,
        call: &ToolCall,
        tools: &ToolSet,
        events: &EventSink,
    ) -> AgentResult<ToolOutput> {
        let result = tools.call(&call.name, call.arguments.clone()).await;

        events.emit(CrewEvent::ToolInvoked {
            agent_role: self.role.clone(),
            tool: call.name.clone(),
            success: matches!(&result, Ok(output) if output.success),
        });

        match result {
            Ok(output) => Ok(output),
            Err(ToolError::Llm(e)) => Err(AgentError::Llm(e)),
            Err(e) => Ok(ToolOutput::err(format!(
                "{}. Available tools: {}",
                e,
                tools.names().join(", ")
            ))),
        }
    }

    fn final_answer(&self, content: Option<String>) -> AgentResult<String> {
        let raw = content.ok_or_else(|| AgentError::EmptyResponse(self.role.clone()))?;

        if self.verbose {
            tracing::info!(agent = %self.role, "Final answer:\n{}", raw);
        }

        Ok(raw)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("allow_delegation", &self.allow_delegation)
            .field("tools", &self.tools)
            .field("llm", &self.llm.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::agents::test_support::{text, tool_call, ScriptedProvider};
    use crate::llm::{LlmError, MessageRole};
    use crate::tools::{FileReadTool, Tool, ToolResult};

    /// Tool that makes its own model call, with a fixed outcome
    struct ModelBackedTool {
        outcome: Result<UsageStats, LlmError>,
    }

    #[async_trait]
    impl Tool for ModelBackedTool {
        fn name(&self) -> &str {
            "consult"
        }

        fn description(&self) -> &str {
            "Ask another model"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }

        async fn execute(&self, _args: serde_json::Value) -> ToolResult<ToolOutput> {
            match &self.outcome {
                Ok(usage) => Ok(ToolOutput::ok("consulted").with_usage(*usage)),
                Err(e) => Err(ToolError::Llm(e.clone())),
            }
        }
    }

    fn agent(provider: Arc<ScriptedProvider>) -> Agent {
        Agent::new(
            "Code Reviewer",
            "Maintain code quality standards.",
            "You are a meticulous code reviewer.",
            provider,
        )
    }

    #[test]
    fn test_agent_creation() {
        let agent = agent(ScriptedProvider::new(vec![]));

        assert_eq!(agent.role, "Code Reviewer");
        assert!(!agent.allow_delegation);
        assert_eq!(agent.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(agent.has_role("  code reviewer "));
    }

    #[test]
    fn test_task_messages_include_persona_and_context() {
        let agent = agent(ScriptedProvider::new(vec![]));
        let task = Task::new("Review the plan", "A review report", &agent);

        let messages = agent.task_messages(&task, Some("THE PLAN"));

        assert_eq!(messages[0].role, MessageRole::System);
        let system = messages[0].content.as_deref().unwrap();
        assert!(system.starts_with("You are Code Reviewer. You are a meticulous code reviewer."));
        assert!(system.contains("Your personal goal is: Maintain code quality standards."));

        let user = messages[1].content.as_deref().unwrap();
        assert!(user.contains("Current Task: Review the plan"));
        assert!(user.contains("This is the context you're working with:\nTHE PLAN"));
    }

    #[tokio::test]
    async fn test_plain_answer_returns_immediately() {
        let provider = ScriptedProvider::new(vec![text("Looks good")]);
        let agent = agent(provider.clone());
        let task = Task::new("Review", "Review report", &agent);

        let run = agent
            .execute_task(&task, None, &ToolSet::new(), &EventSink::default())
            .await
            .unwrap();

        assert_eq!(run.raw, "Looks good");
        assert_eq!(run.iterations, 1);
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_tool_results_are_fed_back() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plan.md");
        std::fs::write(&file, "# Plan").unwrap();

        let provider = ScriptedProvider::new(vec![
            tool_call("call_1", "read_file", serde_json::json!({"file_path": file})),
            text("Reviewed"),
        ]);
        let agent = agent(provider.clone());
        let tools = ToolSet::new().with(Arc::new(FileReadTool::new()));
        let task = Task::new("Review", "Review report", &agent);

        let run = agent
            .execute_task(&task, None, &tools, &EventSink::default())
            .await
            .unwrap();

        assert_eq!(run.raw, "Reviewed");
        let second = provider.request(1);
        let tool_msg = second.last().unwrap();
        assert_eq!(tool_msg.role, MessageRole::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_msg.content.as_deref(), Some("# Plan"));
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_to_model() {
        let provider = ScriptedProvider::new(vec![
            tool_call("call_1", "deploy", serde_json::json!({})),
            text("Done"),
        ]);
        let agent = agent(provider.clone());
        let task = Task::new("Review", "Review report", &agent);

        agent
            .execute_task(&task, None, &ToolSet::new(), &EventSink::default())
            .await
            .unwrap();

        let tool_msg = provider.request(1).last().cloned().unwrap();
        assert!(tool_msg.content.unwrap().contains("Tool not found: deploy"));
    }

    #[tokio::test]
    async fn test_tool_usage_counts_toward_run() {
        let provider = ScriptedProvider::new(vec![
            tool_call("c1", "consult", serde_json::json!({})),
            text("Done"),
        ]);
        let agent = agent(provider);
        let tools = ToolSet::new().with(Arc::new(ModelBackedTool {
            outcome: Ok(UsageStats {
                prompt_tokens: 100,
                completion_tokens: 40,
            }),
        }));
        let task = Task::new("Review", "Review report", &agent);

        let run = agent
            .execute_task(&task, None, &tools, &EventSink::default())
            .await
            .unwrap();

        assert_eq!(run.usage.prompt_tokens, 10 + 100 + 10);
        assert_eq!(run.usage.completion_tokens, 2 + 40 + 5);
    }

    #[tokio::test]
    async fn test_model_failure_inside_tool_ends_run() {
        let provider = ScriptedProvider::new(vec![
            tool_call("c1", "consult", serde_json::json!({})),
            text("Never reached"),
        ]);
        let agent = agent(provider.clone());
        let tools = ToolSet::new().with(Arc::new(ModelBackedTool {
            outcome: Err(LlmError::RateLimited {
                message: "slow down".to_string(),
            }),
        }));
        let task = Task::new("Review", "Review report", &agent);

        let err = agent
            .execute_task(&task, None, &tools, &EventSink::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Llm(LlmError::RateLimited { .. })));
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_iteration_limit_forces_final_answer() {
        let provider = ScriptedProvider::new(vec![
            tool_call("c1", "list_directory", serde_json::json!({})),
            tool_call("c2", "list_directory", serde_json::json!({})),
            text("Forced answer"),
        ]);
        let agent = agent(provider.clone()).with_max_iterations(2);
        let task = Task::new("Review", "Review report", &agent);

        let run = agent
            .execute_task(&task, None, &ToolSet::new(), &EventSink::default())
            .await
            .unwrap();

        assert_eq!(run.raw, "Forced answer");
        assert_eq!(run.iterations, 3);
        assert!(provider.tools_offered(2).is_empty());
    }

    #[tokio::test]
    async fn test_empty_answer_is_an_error() {
        let provider = ScriptedProvider::new(vec![crate::llm::LlmResponse {
            content: None,
            tool_calls: vec![],
            usage: UsageStats::default(),
            model: "scripted".to_string(),
        }]);
        let agent = agent(provider);
        let task = Task::new("Review", "Review report", &agent);

        let err = agent
            .execute_task(&task, None, &ToolSet::new(), &EventSink::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::EmptyResponse(role) if role == "Code Reviewer"));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let agent = agent(ScriptedProvider::new(vec![]));
        let task = Task::new("Review", "Review report", &agent);

        let err = agent
            .execute_task(&task, None, &ToolSet::new(), &EventSink::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Llm(_)));
    }
}
