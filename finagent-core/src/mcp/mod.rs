//! Remote tool server access over MCP.
//!
//! The handler talks to the tool server through two small traits so the
//! fallback logic can be exercised without a network:
//!
//! - [`ToolServerConnector`] opens an authenticated session.
//! - [`ToolSession`] discovers and invokes tools and is closed explicitly.
//!
//! [`RmcpConnector`] is the production implementation on top of `rmcp`'s
//! streamable HTTP client transport.

pub mod errors;
mod session;

pub use errors::{ErrorCode, McpResult};
pub use session::{RmcpConnector, RmcpSession};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Description of a tool advertised by the remote server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// An open, authenticated connection to the tool server.
#[async_trait]
pub trait ToolSession: Send + Sync {
    async fn list_tools(&self) -> McpResult<Vec<RemoteToolInfo>>;

    /// Invoke `name`; a tool-level error result is returned as `Err`.
    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<Value>;

    /// Release the connection. Closing an already closed session is a no-op.
    async fn close(&self) -> McpResult<()>;
}

/// Opens tool-server sessions with a bearer token.
#[async_trait]
pub trait ToolServerConnector: Send + Sync {
    async fn connect(&self, bearer_token: &str) -> McpResult<Arc<dyn ToolSession>>;
}
