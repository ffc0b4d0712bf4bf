//! Core runtime for the finance agent.
//!
//! A request flows through [`handler::InvocationHandler`]: it obtains a
//! client-credentials token ([`auth`]), opens an MCP session to the finance
//! tool server ([`mcp`]), and runs the model's tool-use loop ([`agent`])
//! with the remote tools plus the local file tools ([`tools`]). When the
//! tool server cannot be reached the same prompt runs with local tools only.

pub mod agent;
pub mod auth;
pub mod context;
pub mod handler;
pub mod llm;
pub mod mcp;
pub mod server;
pub mod tools;

pub use context::AppContext;
pub use handler::{InvocationHandler, InvocationRequest, InvocationResponse, SessionSetup};
