use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm::{
    ContentBlock, Message, ModelClient, ModelRequest, Role, StopReason, ToolResult,
    ToolResultStatus, ToolUse,
};
use crate::tools::ToolRegistry;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model request failed: {0:#}")]
    Model(anyhow::Error),
    #[error("agent did not finish within {0} model turns")]
    TurnLimitExceeded(usize),
}

/// Drives the model's tool-use loop for a single prompt.
pub struct Agent {
    model: Arc<dyn ModelClient>,
    tools: ToolRegistry,
    system_prompt: String,
    max_turns: usize,
}

impl Agent {
    pub const DEFAULT_MAX_TURNS: usize = 16;

    pub fn new(
        model: Arc<dyn ModelClient>,
        tools: ToolRegistry,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model,
            tools,
            system_prompt: system_prompt.into(),
            max_turns: Self::DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    /// Run `prompt` to completion and return the final assistant message.
    pub async fn run(&self, prompt: &str) -> Result<Message, AgentError> {
        let definitions = self.tools.definitions();
        let mut messages = vec![Message::user_text(prompt)];

        for turn in 1..=self.max_turns {
            let response = self
                .model
                .converse(ModelRequest {
                    system_prompt: &self.system_prompt,
                    messages: &messages,
                    tools: &definitions,
                })
                .await
                .map_err(AgentError::Model)?;

            debug!(turn, stop_reason = ?response.stop_reason, "Model turn completed");

            let tool_uses: Vec<ToolUse> = response.message.tool_uses().cloned().collect();
            if response.stop_reason != StopReason::ToolUse || tool_uses.is_empty() {
                info!(turns = turn, "Agent finished");
                return Ok(response.message);
            }

            messages.push(response.message);

            let mut results = Vec::with_capacity(tool_uses.len());
            for tool_use in tool_uses {
                results.push(ContentBlock::ToolResult(self.execute_tool(tool_use).await));
            }
            messages.push(Message::new(Role::User, results));
        }

        Err(AgentError::TurnLimitExceeded(self.max_turns))
    }

    async fn execute_tool(&self, tool_use: ToolUse) -> ToolResult {
        let ToolUse {
            tool_use_id,
            name,
            input,
        } = tool_use;

        let Some(tool) = self.tools.get(&name) else {
            warn!(tool = %name, "Model requested an unknown tool");
            return ToolResult {
                tool_use_id,
                content: format!("Unknown tool '{name}'"),
                status: ToolResultStatus::Error,
            };
        };

        match tool.execute(input).await {
            Ok(output) => {
                debug!(tool = %name, "Tool call succeeded");
                ToolResult {
                    tool_use_id,
                    content: render_output(output),
                    status: ToolResultStatus::Success,
                }
            }
            Err(err) => {
                warn!(tool = %name, error = %format!("{err:#}"), "Tool call failed");
                ToolResult {
                    tool_use_id,
                    content: format!("{err:#}"),
                    status: ToolResultStatus::Error,
                }
            }
        }
    }
}

fn render_output(output: Value) -> String {
    match output {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
