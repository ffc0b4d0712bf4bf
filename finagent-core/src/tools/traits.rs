use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::llm::ToolDefinition;

/// A callable tool exposed to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema describing the accepted arguments.
    fn input_schema(&self) -> Value;

    /// Execute the tool. Errors are reported back to the model as failed
    /// tool results rather than aborting the agent.
    async fn execute(&self, args: Value) -> Result<Value>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}
