//! The engineering crew
//!
//! Three agents share one LLM and one tool set. Three tasks run in
//! order: architecture analysis, a feature plan built on that analysis,
//! and a review of the plan.

use std::sync::Arc;

use super::agent::Agent;
use super::crew::Crew;
use super::errors::AgentResult;
use super::task::Task;
use super::types::Process;
use crate::config::Settings;
use crate::llm::LlmProvider;
use crate::tools::ToolSet;

pub const TECH_LEAD: &str = "Tech Lead";
pub const SENIOR_ENGINEER: &str = "Senior Software Engineer";
pub const CODE_REVIEWER: &str = "Code Reviewer";

pub fn senior_engineer(llm: Arc<dyn LlmProvider>, tools: ToolSet) -> Agent {
    Agent::new(
        SENIOR_ENGINEER,
        "Create high-quality, efficient, and scalable code solutions.",
        "You are a seasoned software engineer with extensive experience in TypeScript, React, \
         and Node.js. You understand design patterns, clean code principles, and performance \
         optimization. You are working on the 'World Monitor' project.",
        llm,
    )
    .with_tools(tools)
    .allow_delegation(false)
}

pub fn tech_lead(llm: Arc<dyn LlmProvider>, tools: ToolSet) -> Agent {
    Agent::new(
        TECH_LEAD,
        "Ensure the technical architecture is sound and aligns with project goals.",
        "You are the technical visionary for the project. You review architectural decisions, \
         ensure scalability, and guide the development team. You are detail-oriented and catch \
         potential issues early.",
        llm,
    )
    .with_tools(tools)
    .allow_delegation(true)
}

pub fn code_reviewer(llm: Arc<dyn LlmProvider>, tools: ToolSet) -> Agent {
    Agent::new(
        CODE_REVIEWER,
        "Maintain code quality standards and ensure bug-free delivery.",
        "You are a meticulous code reviewer. You look for logic errors, security \
         vulnerabilities, and maintainability issues. You ensure that the code follows the \
         project's style guide.",
        llm,
    )
    .with_tools(tools)
    .allow_delegation(false)
}

/// Task 1: survey the codebase
pub fn analyze_architecture(tech_lead: &Agent) -> Task {
    Task::new(
        "Analyze the current source code structure in the 'src' directory. \
         Identify the main components and services. \
         Provide a summary of the architecture and suggest 3 key improvements based on modern \
         practices.",
        "A markdown report summarizing the architecture and 3 improvement suggestions.",
        tech_lead,
    )
    .named("analyze_architecture")
}

/// Task 2: plan the User Preferences module from the analysis
pub fn plan_user_preferences(senior_engineer: &Agent, analysis: &Task) -> Task {
    Task::new(
        "Based on the architecture analysis, draft a technical plan for adding a \
         'User Preferences' module. This module should allow users to save their dashboard \
         layout settings. Outline the necessary files, data structures, and API modifications.",
        "A technical specification document for the User Preferences module.",
        senior_engineer,
    )
    .named("plan_user_preferences")
    .with_context(&[analysis])
}

/// Task 3: review the plan
pub fn review_plan(code_reviewer: &Agent, plan: &Task) -> Task {
    Task::new(
        "Review the technical plan for the 'User Preferences' module. \
         Check for potential edge cases, security implications (e.g., input validation), and \
         integration challenges. Provide constructive feedback.",
        "A review report with approval or requested changes.",
        code_reviewer,
    )
    .named("review_plan")
    .with_context(&[plan])
}

/// Assemble the crew: agents, chained tasks, sequential process
pub fn engineering_crew(
    settings: &Settings,
    llm: Arc<dyn LlmProvider>,
    tools: ToolSet,
) -> AgentResult<Crew> {
    let verbose = settings.verbose;

    let senior_engineer = senior_engineer(llm.clone(), tools.clone()).verbose(verbose);
    let tech_lead = tech_lead(llm.clone(), tools.clone()).verbose(verbose);
    let code_reviewer = code_reviewer(llm, tools).verbose(verbose);

    let task1 = analyze_architecture(&tech_lead);
    let task2 = plan_user_preferences(&senior_engineer, &task1);
    let task3 = review_plan(&code_reviewer, &task2);

    let crew = Crew::new(
        vec![tech_lead, senior_engineer, code_reviewer],
        vec![task1, task2, task3],
        Process::Sequential,
    )?
    .verbose(verbose);

    Ok(crew)
}
