//! Model access.
//!
//! The agent only depends on [`ModelClient`]; [`BedrockModel`] implements
//! it against the Bedrock Converse API.

mod bedrock;
mod document;
mod types;

pub use bedrock::BedrockModel;
pub use types::{
    ContentBlock, Message, ModelRequest, ModelResponse, Role, StopReason, ToolDefinition,
    ToolResult, ToolResultStatus, ToolUse,
};

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ModelClient: Send + Sync {
    fn model_id(&self) -> &str;

    /// Send the conversation so far and return the model's next message.
    async fn converse(&self, request: ModelRequest<'_>) -> Result<ModelResponse>;
}
