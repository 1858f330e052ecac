// Crew event stream
//
// Events are logged as they happen and optionally forwarded to a
// subscriber channel.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::llm::UsageStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CrewEvent {
    KickoffStarted { crew_id: Uuid, task_count: usize },
    TaskStarted { task_id: Uuid, agent_role: String },
    ToolInvoked { agent_role: String, tool: String, success: bool },
    DelegationRequested { from_role: String, to_role: String },
    TaskCompleted { task_id: Uuid, agent_role: String, output_chars: usize },
    KickoffCompleted { crew_id: Uuid, usage: UsageStats },
}

impl std::fmt::Display for CrewEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrewEvent::KickoffStarted { crew_id, task_count } => {
                write!(f, "Crew {} starting {} task(s)", crew_id, task_count)
            }
            CrewEvent::TaskStarted { task_id, agent_role } => {
                write!(f, "[{}] Working on task {}", agent_role, task_id)
            }
            CrewEvent::ToolInvoked {
                agent_role,
                tool,
                success,
            } => write!(
                f,
                "[{}] Used tool {} ({})",
                agent_role,
                tool,
                if *success { "ok" } else { "error" }
            ),
            CrewEvent::DelegationRequested { from_role, to_role } => {
                write!(f, "[{}] Delegating to {}", from_role, to_role)
            }
            CrewEvent::TaskCompleted {
                task_id,
                agent_role,
                output_chars,
            } => write!(
                f,
                "[{}] Finished task {} ({} chars)",
                agent_role, task_id, output_chars
            ),
            CrewEvent::KickoffCompleted { crew_id, usage } => write!(
                f,
                "Crew {} finished ({} prompt / {} completion tokens)",
                crew_id, usage.prompt_tokens, usage.completion_tokens
            ),
        }
    }
}

/// Where crew events go
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<CrewEvent>>,
    verbose: bool,
}

impl EventSink {
    pub fn new(tx: Option<mpsc::UnboundedSender<CrewEvent>>, verbose: bool) -> Self {
        Self { tx, verbose }
    }

    pub fn emit(&self, event: CrewEvent) {
        if self.verbose {
            tracing::info!("{}", event);
        } else {
            tracing::debug!("{}", event);
        }

        if let Some(tx) = &self.tx {
            // Subscriber may have gone away
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_forwards_to_subscriber() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(Some(tx), false);
        let event = CrewEvent::DelegationRequested {
            from_role: "Tech Lead".to_string(),
            to_role: "Code Reviewer".to_string(),
        };

        sink.emit(event.clone());

        assert_eq!(rx.try_recv().unwrap(), event);
    }

    #[test]
    fn emit_survives_dropped_subscriber() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        EventSink::new(Some(tx), true).emit(CrewEvent::KickoffStarted {
            crew_id: Uuid::new_v4(),
            task_count: 3,
        });
    }

    #[test]
    fn display_is_readable() {
        let event = CrewEvent::ToolInvoked {
            agent_role: "Senior Software Engineer".to_string(),
            tool: "read_file".to_string(),
            success: false,
        };

        assert_eq!(
            event.to_string(),
            "[Senior Software Engineer] Used tool read_file (error)"
        );
    }
}
