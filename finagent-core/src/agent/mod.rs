//! Minimal tool-use loop over a [`ModelClient`](crate::llm::ModelClient).

pub mod prompts;
mod runner;

pub use runner::{Agent, AgentError};
