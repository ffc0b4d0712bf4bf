/// Error helpers for tool-server operations
///
/// Tool-server failures are plain `anyhow` errors tagged with a code so
/// log lines can be grepped by failure class.
/// - MCP_E001-E010: Tool-related errors
/// - MCP_E011-E020: Server connectivity errors
use anyhow::anyhow;
use std::fmt;

pub type McpResult<T> = anyhow::Result<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// MCP_E001: Tool invocation failed
    ToolInvocationFailed = 1,
    /// MCP_E002: Tool reported an error result
    ToolReportedError = 2,
    /// MCP_E011: Server unreachable or handshake failed
    ServerUnavailable = 11,
    /// MCP_E012: Tool discovery failed
    DiscoveryFailed = 12,
    /// MCP_E013: Session already closed
    SessionClosed = 13,
    /// MCP_E014: Session shutdown failed
    ShutdownFailed = 14,
}

impl ErrorCode {
    pub fn code(&self) -> String {
        format!("MCP_E{:03}", *self as u32)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

pub fn server_unavailable(url: &str, reason: impl fmt::Display) -> anyhow::Error {
    anyhow!(
        "[{}] MCP server at '{}' is unavailable: {}",
        ErrorCode::ServerUnavailable.code(),
        url,
        reason
    )
}

pub fn discovery_failed(url: &str, reason: impl fmt::Display) -> anyhow::Error {
    anyhow!(
        "[{}] Failed to list tools from MCP server at '{}': {}",
        ErrorCode::DiscoveryFailed.code(),
        url,
        reason
    )
}

pub fn tool_invocation_failed(tool: &str, reason: impl fmt::Display) -> anyhow::Error {
    anyhow!(
        "[{}] Failed to invoke MCP tool '{}': {}",
        ErrorCode::ToolInvocationFailed.code(),
        tool,
        reason
    )
}

pub fn tool_reported_error(tool: &str, message: &str) -> anyhow::Error {
    anyhow!(
        "[{}] MCP tool '{}' returned an error: {}",
        ErrorCode::ToolReportedError.code(),
        tool,
        message
    )
}

pub fn session_closed() -> anyhow::Error {
    anyhow!(
        "[{}] MCP session has already been closed",
        ErrorCode::SessionClosed.code()
    )
}

pub fn shutdown_failed(reason: impl fmt::Display) -> anyhow::Error {
    anyhow!(
        "[{}] Failed to close MCP session: {}",
        ErrorCode::ShutdownFailed.code(),
        reason
    )
}
