use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::types as bedrock;
use finagent_config::AgentConfig;
use tracing::debug;

use super::document::{document_to_json, json_to_document};
use super::types::{
    ContentBlock, Message, ModelRequest, ModelResponse, Role, StopReason, ToolDefinition,
    ToolResultStatus, ToolUse,
};
use super::ModelClient;

/// [`ModelClient`] backed by the Bedrock Converse API.
#[derive(Debug, Clone)]
pub struct BedrockModel {
    client: Client,
    model_id: String,
}

impl BedrockModel {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    /// Build a client for the configured region using the default AWS
    /// credential chain.
    pub async fn from_config(config: &AgentConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .load()
            .await;
        Self::new(Client::new(&sdk_config), config.model_id.clone())
    }
}

#[async_trait]
impl ModelClient for BedrockModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn converse(&self, request: ModelRequest<'_>) -> Result<ModelResponse> {
        let messages = request
            .messages
            .iter()
            .map(to_bedrock_message)
            .collect::<Result<Vec<_>>>()?;

        let tool_config = if request.tools.is_empty() {
            None
        } else {
            Some(to_tool_configuration(request.tools)?)
        };

        debug!(
            model = %self.model_id,
            messages = messages.len(),
            tools = request.tools.len(),
            "Sending Converse request"
        );

        let output = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(bedrock::SystemContentBlock::Text(
                request.system_prompt.to_string(),
            ))
            .set_messages(Some(messages))
            .set_tool_config(tool_config)
            .send()
            .await
            .map_err(|err| {
                anyhow!(
                    "Bedrock Converse request for '{}' failed: {}",
                    self.model_id,
                    DisplayErrorContext(&err)
                )
            })?;

        let stop_reason = from_bedrock_stop_reason(output.stop_reason());
        let message = output
            .output()
            .and_then(|out| out.as_message().ok())
            .ok_or_else(|| anyhow!("Bedrock Converse response contained no message"))?;

        Ok(ModelResponse {
            message: from_bedrock_message(message),
            stop_reason,
        })
    }
}

fn to_bedrock_message(message: &Message) -> Result<bedrock::Message> {
    let role = match message.role {
        Role::User => bedrock::ConversationRole::User,
        Role::Assistant => bedrock::ConversationRole::Assistant,
    };

    let content = message
        .content
        .iter()
        .map(to_bedrock_block)
        .collect::<Result<Vec<_>>>()?;

    bedrock::Message::builder()
        .role(role)
        .set_content(Some(content))
        .build()
        .context("Failed to build Bedrock message")
}

fn to_bedrock_block(block: &ContentBlock) -> Result<bedrock::ContentBlock> {
    Ok(match block {
        ContentBlock::Text(text) => bedrock::ContentBlock::Text(text.clone()),
        ContentBlock::ToolUse(tool_use) => bedrock::ContentBlock::ToolUse(
            bedrock::ToolUseBlock::builder()
                .tool_use_id(&tool_use.tool_use_id)
                .name(&tool_use.name)
                .input(json_to_document(&tool_use.input))
                .build()
                .context("Failed to build Bedrock tool use block")?,
        ),
        ContentBlock::ToolResult(result) => {
            let status = match result.status {
                ToolResultStatus::Success => bedrock::ToolResultStatus::Success,
                ToolResultStatus::Error => bedrock::ToolResultStatus::Error,
            };
            bedrock::ContentBlock::ToolResult(
                bedrock::ToolResultBlock::builder()
                    .tool_use_id(&result.tool_use_id)
                    .content(bedrock::ToolResultContentBlock::Text(result.content.clone()))
                    .status(status)
                    .build()
                    .context("Failed to build Bedrock tool result block")?,
            )
        }
    })
}

fn to_tool_configuration(tools: &[ToolDefinition]) -> Result<bedrock::ToolConfiguration> {
    let specs = tools
        .iter()
        .map(|tool| {
            bedrock::ToolSpecification::builder()
                .name(&tool.name)
                .description(&tool.description)
                .input_schema(bedrock::ToolInputSchema::Json(json_to_document(
                    &tool.input_schema,
                )))
                .build()
                .map(bedrock::Tool::ToolSpec)
                .with_context(|| format!("Failed to build tool specification for '{}'", tool.name))
        })
        .collect::<Result<Vec<_>>>()?;

    bedrock::ToolConfiguration::builder()
        .set_tools(Some(specs))
        .build()
        .context("Failed to build Bedrock tool configuration")
}

fn from_bedrock_message(message: &bedrock::Message) -> Message {
    let role = match message.role() {
        bedrock::ConversationRole::User => Role::User,
        _ => Role::Assistant,
    };

    let content = message
        .content()
        .iter()
        .filter_map(|block| match block {
            bedrock::ContentBlock::Text(text) => Some(ContentBlock::Text(text.clone())),
            bedrock::ContentBlock::ToolUse(tool_use) => Some(ContentBlock::ToolUse(ToolUse {
                tool_use_id: tool_use.tool_use_id().to_string(),
                name: tool_use.name().to_string(),
                input: document_to_json(tool_use.input()),
            })),
            other => {
                debug!(block = ?other, "Ignoring unsupported content block from model");
                None
            }
        })
        .collect();

    Message::new(role, content)
}

fn from_bedrock_stop_reason(reason: &bedrock::StopReason) -> StopReason {
    match reason {
        bedrock::StopReason::EndTurn => StopReason::EndTurn,
        bedrock::StopReason::ToolUse => StopReason::ToolUse,
        bedrock::StopReason::MaxTokens => StopReason::MaxTokens,
        bedrock::StopReason::StopSequence => StopReason::StopSequence,
        other => StopReason::Other(other.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ToolResult;
    use serde_json::json;

    #[test]
    fn tool_round_trip_through_bedrock_types() {
        let message = Message::new(
            Role::Assistant,
            vec![
                ContentBlock::Text("Looking it up".into()),
                ContentBlock::ToolUse(ToolUse {
                    tool_use_id: "tu-7".into(),
                    name: "get_quote".into(),
                    input: json!({"symbol": "MSFT"}),
                }),
            ],
        );

        let converted = to_bedrock_message(&message).unwrap();
        assert_eq!(converted.role(), &bedrock::ConversationRole::Assistant);
        assert_eq!(from_bedrock_message(&converted), message);
    }

    #[test]
    fn tool_results_are_not_read_back_from_model_output() {
        let message = Message::new(
            Role::User,
            vec![ContentBlock::ToolResult(ToolResult {
                tool_use_id: "tu-7".into(),
                content: "410.2".into(),
                status: ToolResultStatus::Success,
            })],
        );

        let converted = to_bedrock_message(&message).unwrap();
        assert_eq!(converted.content().len(), 1);
        assert!(from_bedrock_message(&converted).content.is_empty());
    }

    #[test]
    fn builds_tool_configuration_for_each_definition() {
        let tools = vec![
            ToolDefinition {
                name: "file_read".into(),
                description: "Read files".into(),
                input_schema: json!({"type": "object"}),
            },
            ToolDefinition {
                name: "get_quote".into(),
                description: "Stock quote".into(),
                input_schema: json!({"type": "object", "properties": {"symbol": {"type": "string"}}}),
            },
        ];
        let config = to_tool_configuration(&tools).unwrap();
        assert_eq!(config.tools().len(), 2);
    }

    #[test]
    fn maps_stop_reasons() {
        assert_eq!(
            from_bedrock_stop_reason(&bedrock::StopReason::ToolUse),
            StopReason::ToolUse
        );
        assert_eq!(
            from_bedrock_stop_reason(&bedrock::StopReason::EndTurn),
            StopReason::EndTurn
        );
        assert!(matches!(
            from_bedrock_stop_reason(&bedrock::StopReason::GuardrailIntervened),
            StopReason::Other(_)
        ));
    }
}
