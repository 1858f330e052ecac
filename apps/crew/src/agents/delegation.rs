// Delegation tools
//
// Agents with `allow_delegation` get two extra tools that run a coworker
// on an ad-hoc task. The coworker works with its own tools only, so
// delegation never nests.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;

use super::agent::Agent;
use super::errors::AgentError;
use super::events::{CrewEvent, EventSink};
use super::prompts::library;
use super::task::Task;
use crate::tools::{Tool, ToolError, ToolOutput, ToolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DelegationKind {
    DelegateWork,
    AskQuestion,
}

impl DelegationKind {
    fn tool_name(&self) -> &'static str {
        match self {
            DelegationKind::DelegateWork => "delegate_work",
            DelegationKind::AskQuestion => "ask_question",
        }
    }

    fn request_field(&self) -> &'static str {
        match self {
            DelegationKind::DelegateWork => "task",
            DelegationKind::AskQuestion => "question",
        }
    }
}

/// Hands a task or question to a coworker and returns the coworker's answer
pub struct DelegationTool {
    kind: DelegationKind,
    from_role: String,
    coworkers: Vec<Agent>,
    events: EventSink,
    description: String,
}

impl DelegationTool {
    /// `delegate_work`: ask a coworker to do a piece of work
    pub fn delegate_work(from_role: &str, coworkers: Vec<Agent>, events: EventSink) -> Self {
        Self::new(DelegationKind::DelegateWork, from_role, coworkers, events)
    }

    /// `ask_question`: ask a coworker a question
    pub fn ask_question(from_role: &str, coworkers: Vec<Agent>, events: EventSink) -> Self {
        Self::new(DelegationKind::AskQuestion, from_role, coworkers, events)
    }

    fn new(kind: DelegationKind, from_role: &str, coworkers: Vec<Agent>, events: EventSink) -> Self {
        let roles = coworker_roles(&coworkers);
        let description = match kind {
            DelegationKind::DelegateWork => format!(
                "Delegate a specific task to one of the following coworkers: {}. \
                 Provide the coworker's role, the task, and all the context they need; \
                 they know nothing about your task otherwise.",
                roles
            ),
            DelegationKind::AskQuestion => format!(
                "Ask a specific question to one of the following coworkers: {}. \
                 Provide the coworker's role, the question, and all the context they need; \
                 they know nothing about your task otherwise.",
                roles
            ),
        };

        Self {
            kind,
            from_role: from_role.to_string(),
            coworkers,
            events,
            description,
        }
    }

    fn find_coworker(&self, role: &str) -> Option<&Agent> {
        self.coworkers.iter().find(|a| a.has_role(role))
    }
}

fn coworker_roles(coworkers: &[Agent]) -> String {
    coworkers
        .iter()
        .map(|a| a.role.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn required_str<'a>(args: &'a serde_json::Value, key: &str) -> ToolResult<&'a str> {
    args[key]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{}' parameter", key)))
}

#[async_trait]
impl Tool for DelegationTool {
    fn name(&self) -> &str {
        self.kind.tool_name()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let field = self.kind.request_field();
        json!({
            "type": "object",
            "properties": {
                "coworker": {
                    "type": "string",
                    "description": "Role of the coworker"
                },
                field: {
                    "type": "string",
                    "description": format!("The {} for the coworker", field)
                },
                "context": {
                    "type": "string",
                    "description": "Everything the coworker needs to know"
                }
            },
            "required": ["coworker", field, "context"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> ToolResult<ToolOutput> {
        let role = required_str(&args, "coworker")?;
        let request = required_str(&args, self.kind.request_field())?;
        let context = args["context"].as_str().unwrap_or_default();

        let Some(coworker) = self.find_coworker(role) else {
            return Ok(ToolOutput::err(format!(
                "Coworker '{}' not found. Available coworkers: {}",
                role,
                coworker_roles(&self.coworkers)
            )));
        };

        self.events.emit(CrewEvent::DelegationRequested {
            from_role: self.from_role.clone(),
            to_role: coworker.role.clone(),
        });

        let task = Task::new(
            request,
            library::delegation().render(&HashMap::new()),
            coworker,
        )
        .named(self.kind.tool_name());

        let run = coworker
            .execute_task(&task, Some(context), coworker.tools(), &self.events)
            .await
            .map_err(|e| match e {
                AgentError::Llm(e) => ToolError::Llm(e),
                other => ToolError::Execution(other.to_string()),
            })?;

        Ok(ToolOutput::ok(run.raw).with_usage(run.usage))
    }
}
