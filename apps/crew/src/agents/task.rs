use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agent::Agent;

/// A prompt plus expected-output description assigned to one agent
///
/// `context` lists earlier tasks whose outputs are concatenated, in
/// order, into this task's prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: String,
    pub expected_output: String,
    pub agent_role: String,
    pub context: Vec<Uuid>,
}

impl Task {
    /// Create a task assigned to `agent`
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: &Agent,
    ) -> Self {
        Self::for_role(description, expected_output, agent.role.clone())
    }

    /// Create a task assigned by role name
    pub fn for_role(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent_role: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            description: description.into(),
            expected_output: expected_output.into(),
            agent_role: agent_role.into(),
            context: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Feed the outputs of `tasks` into this task, in the given order
    pub fn with_context(mut self, tasks: &[&Task]) -> Self {
        self.context = tasks.iter().map(|t| t.id).collect();
        self
    }

    /// Short label for logs
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.description.split_whitespace().take(8).collect::<Vec<_>>().join(" "),
        }
    }
}
