// Agent system modules
//
// Role-playing agents, the tasks assigned to them, and the crew that
// runs those tasks in order.

pub mod agent;
pub mod crew;
pub mod delegation;
pub mod errors;
pub mod events;
pub mod prompts;
pub mod roster;
pub mod task;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types
pub use agent::Agent;
pub use crew::Crew;
pub use errors::{AgentError, AgentResult};
pub use events::CrewEvent;
pub use task::Task;
pub use types::{CrewOutput, Process, TaskOutput};
