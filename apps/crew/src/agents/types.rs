use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::UsageStats;

/// How a crew schedules its tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Process {
    /// Tasks run one after another in declared order
    Sequential,
    /// A manager agent assigns tasks to workers
    Hierarchical,
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Process::Sequential => write!(f, "sequential"),
            Process::Hierarchical => write!(f, "hierarchical"),
        }
    }
}

/// Output of one task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task_id: Uuid,
    pub task_name: Option<String>,
    pub description: String,
    pub agent_role: String,
    pub raw: String,
    pub usage: UsageStats,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Result of a crew kickoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewOutput {
    /// Raw output of the final task
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
    pub usage: UsageStats,
}

impl std::fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Answer produced by a single agent run
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRun {
    pub raw: String,
    pub usage: UsageStats,
    pub iterations: usize,
}
