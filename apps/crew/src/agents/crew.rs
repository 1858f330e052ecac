use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::agent::Agent;
use super::delegation::DelegationTool;
use super::errors::{AgentError, AgentResult};
use super::events::{CrewEvent, EventSink};
use super::task::Task;
use super::types::{CrewOutput, Process, TaskOutput};
use crate::llm::UsageStats;
use crate::tools::ToolSet;

/// Separator placed between context outputs fed into a task prompt
pub const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// A group of agents and the ordered tasks they execute
///
/// # Invariants
/// - At least one task
/// - Agent roles are unique
/// - Every task is assigned to an agent of the crew
/// - Context references point to earlier tasks only
/// - Only the sequential process is supported
#[derive(Debug)]
pub struct Crew {
    id: Uuid,
    agents: Vec<Agent>,
    tasks: Vec<Task>,
    process: Process,
    verbose: bool,
    event_tx: Option<mpsc::UnboundedSender<CrewEvent>>,
}

impl Crew {
    /// Creates a crew after validating its configuration
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>, process: Process) -> AgentResult<Self> {
        if process != Process::Sequential {
            return Err(AgentError::UnsupportedProcess(process));
        }

        if tasks.is_empty() {
            return Err(AgentError::ConfigError("Crew has no tasks".to_string()));
        }

        let mut roles = HashSet::new();
        for agent in &agents {
            if !roles.insert(agent.role.trim().to_lowercase()) {
                return Err(AgentError::ConfigError(format!(
                    "Duplicate agent role: {}",
                    agent.role
                )));
            }
        }

        let mut earlier = HashSet::new();
        for task in &tasks {
            if !agents.iter().any(|a| a.has_role(&task.agent_role)) {
                return Err(AgentError::AgentNotFound(task.agent_role.clone()));
            }

            for dependency in &task.context {
                if *dependency == task.id {
                    return Err(AgentError::InvalidContext {
                        task: task.id,
                        reason: "task lists itself as context".to_string(),
                    });
                }
                if !earlier.contains(dependency) {
                    return Err(AgentError::InvalidContext {
                        task: task.id,
                        reason: format!("context task {} does not run before it", dependency),
                    });
                }
            }

            earlier.insert(task.id);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            agents,
            tasks,
            process,
            verbose: false,
            event_tx: None,
        })
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Forward crew events to `tx`
    pub fn with_event_sink(mut self, tx: mpsc::UnboundedSender<CrewEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn process(&self) -> Process {
        self.process
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn agent_for(&self, task: &Task) -> AgentResult<&Agent> {
        self.agents
            .iter()
            .find(|a| a.has_role(&task.agent_role))
            .ok_or_else(|| AgentError::AgentNotFound(task.agent_role.clone()))
    }

    /// Tools for one agent: its own plus delegation tools when allowed
    pub fn tools_for(&self, agent: &Agent, events: &EventSink) -> ToolSet {
        let mut tools = agent.tools().clone();

        if agent.allow_delegation {
            let coworkers: Vec<Agent> = self
                .agents
                .iter()
                .filter(|a| a.id != agent.id)
                .cloned()
                .collect();

            if !coworkers.is_empty() {
                tools.push(Arc::new(DelegationTool::delegate_work(
                    &agent.role,
                    coworkers.clone(),
                    events.clone(),
                )));
                tools.push(Arc::new(DelegationTool::ask_question(
                    &agent.role,
                    coworkers,
                    events.clone(),
                )));
            }
        }

        tools
    }

    /// Run every task in order and return the final task's output
    pub async fn kickoff(&self) -> AgentResult<CrewOutput> {
        let events = EventSink::new(self.event_tx.clone(), self.verbose);
        events.emit(CrewEvent::KickoffStarted {
            crew_id: self.id,
            task_count: self.tasks.len(),
        });

        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());
        let mut usage = UsageStats::default();

        for task in &self.tasks {
            let agent = self.agent_for(task)?;
            let context = aggregate_context(task, &outputs);
            let tools = self.tools_for(agent, &events);

            events.emit(CrewEvent::TaskStarted {
                task_id: task.id,
                agent_role: agent.role.clone(),
            });

            let started_at = Utc::now();
            let run = match agent
                .execute_task(task, context.as_deref(), &tools, &events)
                .await
            {
                Ok(run) => run,
                Err(e) => {
                    tracing::error!(task = %task.label(), agent = %agent.role, "Task failed: {}", e);
                    return Err(e);
                }
            };
            usage.add(run.usage);

            events.emit(CrewEvent::TaskCompleted {
                task_id: task.id,
                agent_role: agent.role.clone(),
                output_chars: run.raw.chars().count(),
            });

            outputs.push(TaskOutput {
                task_id: task.id,
                task_name: task.name.clone(),
                description: task.description.clone(),
                agent_role: agent.role.clone(),
                raw: run.raw,
                usage: run.usage,
                started_at,
                completed_at: Utc::now(),
            });
        }

        events.emit(CrewEvent::KickoffCompleted {
            crew_id: self.id,
            usage,
        });

        let raw = outputs.last().map(|o| o.raw.clone()).unwrap_or_default();
        Ok(CrewOutput {
            raw,
            tasks_output: outputs,
            usage,
        })
    }
}

/// Concatenate the outputs of `task`'s context tasks in reference order
pub fn aggregate_context(task: &Task, outputs: &[TaskOutput]) -> Option<String> {
    if task.context.is_empty() {
        return None;
    }

    let parts: Vec<&str> = task
        .context
        .iter()
        .filter_map(|id| outputs.iter().find(|o| o.task_id == *id))
        .map(|o| o.raw.as_str())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(CONTEXT_SEPARATOR))
    }
}
