use std::sync::Arc;

use anyhow::Result;
use finagent_config::AgentConfig;
use tracing::info;

use crate::auth::{OAuth2TokenProvider, TokenSource};
use crate::llm::{BedrockModel, ModelClient};
use crate::mcp::{RmcpConnector, ToolServerConnector};
use crate::tools::{ToolRegistry, Workspace, file_tools};

/// Process-wide dependencies shared by every invocation.
///
/// Built once at startup from a validated [`AgentConfig`]. The token
/// provider lives here so its cache survives across requests.
pub struct AppContext {
    pub config: Arc<AgentConfig>,
    pub tokens: Arc<dyn TokenSource>,
    pub connector: Arc<dyn ToolServerConnector>,
    pub model: Arc<dyn ModelClient>,
    pub local_tools: ToolRegistry,
}

impl AppContext {
    pub fn new(
        config: AgentConfig,
        tokens: Arc<dyn TokenSource>,
        connector: Arc<dyn ToolServerConnector>,
        model: Arc<dyn ModelClient>,
        local_tools: ToolRegistry,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tokens,
            connector,
            model,
            local_tools,
        }
    }

    /// Production wiring: OAuth2 provider, rmcp connector, Bedrock model and
    /// the file tools rooted at the configured workspace.
    pub async fn from_config(config: AgentConfig) -> Result<Self> {
        let workspace = Workspace::new(&config.workspace_root)?;
        let local_tools = file_tools(workspace)?;
        let model = BedrockModel::from_config(&config).await;

        info!(
            model = %config.model_id,
            mcp_url = %config.finance_mcp_url,
            local_tools = local_tools.len(),
            "Initialized agent context"
        );

        Ok(Self::new(
            config.clone(),
            Arc::new(OAuth2TokenProvider::from_config(&config)),
            Arc::new(RmcpConnector::from_config(&config)),
            Arc::new(model),
            local_tools,
        ))
    }
}
