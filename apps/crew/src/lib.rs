//! Engineering Crew Library
//!
//! A small multi-agent workflow: a Tech Lead, a Senior Software Engineer
//! and a Code Reviewer work through three chained tasks against an
//! OpenAI-compatible LLM, with read-only access to the project sources.

pub mod agents;
pub mod config;
pub mod llm;
pub mod tools;
