//! Tools the agent can call: local file tools confined to a workspace and
//! adapters for tools discovered on the MCP server.

mod editor;
mod file_ops;
mod registry;
mod remote;
mod traits;
mod workspace;

use std::sync::Arc;

use anyhow::Result;

pub use editor::EditorTool;
pub use file_ops::{FileReadTool, FileWriteTool, MAX_WRITE_BYTES};
pub use registry::ToolRegistry;
pub use remote::RemoteTool;
pub use traits::Tool;
pub use workspace::Workspace;

/// Registry holding `file_read`, `file_write` and `editor` bound to `workspace`.
pub fn file_tools(workspace: Workspace) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FileReadTool::new(workspace.clone())))?;
    registry.register(Arc::new(FileWriteTool::new(workspace.clone())))?;
    registry.register(Arc::new(EditorTool::new(workspace)))?;
    Ok(registry)
}
