use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::Tool;
use crate::mcp::{RemoteToolInfo, ToolSession};

/// A tool discovered on the MCP server, invoked through the shared session.
pub struct RemoteTool {
    info: RemoteToolInfo,
    session: Arc<dyn ToolSession>,
}

impl RemoteTool {
    pub fn new(info: RemoteToolInfo, session: Arc<dyn ToolSession>) -> Self {
        Self { info, session }
    }
}

#[async_trait]
impl Tool for RemoteTool {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn input_schema(&self) -> Value {
        self.info.input_schema.clone()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        self.session.call_tool(&self.info.name, args).await
    }
}
