use serde_json::{Value, json};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Immutable runtime configuration for one agent process.
///
/// Built by [`crate::ConfigLoader`]; every required field has already been
/// validated by the time a value of this type exists.
#[derive(Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Bedrock model or inference profile identifier
    pub model_id: String,
    /// Streamable HTTP endpoint of the finance MCP server
    pub finance_mcp_url: String,
    /// OAuth2 token endpoint used for the client-credentials grant
    pub auth_server_token_url: String,
    pub mcp_client_id: String,
    pub mcp_client_secret: String,
    /// Space separated scopes requested with each token
    pub token_scope: String,
    /// Region for Bedrock and Secrets Manager clients
    pub aws_region: String,
    /// Root directory the local file tools are confined to
    pub workspace_root: PathBuf,
    pub max_agent_turns: usize,
    pub bind_addr: SocketAddr,
}

impl AgentConfig {
    /// Configuration summary safe to print or log; the client secret is masked.
    pub fn redacted_summary(&self) -> Value {
        json!({
            "model_id": self.model_id,
            "finance_mcp_url": self.finance_mcp_url,
            "auth_server_token_url": self.auth_server_token_url,
            "mcp_client_id": self.mcp_client_id,
            "mcp_client_secret": mask(&self.mcp_client_secret),
            "token_scope": self.token_scope,
            "aws_region": self.aws_region,
            "workspace_root": self.workspace_root.display().to_string(),
            "max_agent_turns": self.max_agent_turns,
            "bind_addr": self.bind_addr.to_string(),
        })
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("model_id", &self.model_id)
            .field("finance_mcp_url", &self.finance_mcp_url)
            .field("auth_server_token_url", &self.auth_server_token_url)
            .field("mcp_client_id", &self.mcp_client_id)
            .field("mcp_client_secret", &mask(&self.mcp_client_secret))
            .field("token_scope", &self.token_scope)
            .field("aws_region", &self.aws_region)
            .field("workspace_root", &self.workspace_root)
            .field("max_agent_turns", &self.max_agent_turns)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
