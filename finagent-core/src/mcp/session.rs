use std::sync::Arc;

use async_trait::async_trait;
use finagent_config::AgentConfig;
use rmcp::ServiceExt;
use rmcp::model::{CallToolRequestParams, ClientCapabilities, ClientInfo, Implementation};
use rmcp::service::{Peer, RoleClient, RunningService};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::errors;
use super::{McpResult, RemoteToolInfo, ToolServerConnector, ToolSession};

const CLIENT_NAME: &str = "finagent";

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: CLIENT_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            description: None,
            icons: None,
            website_url: None,
        },
    }
}

/// Connects to a streamable HTTP MCP endpoint, presenting the OAuth2 token
/// as `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct RmcpConnector {
    endpoint: String,
}

impl RmcpConnector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.finance_mcp_url.clone())
    }
}

#[async_trait]
impl ToolServerConnector for RmcpConnector {
    async fn connect(&self, bearer_token: &str) -> McpResult<Arc<dyn ToolSession>> {
        info!("Connecting to MCP server at {}", self.endpoint);

        let config = StreamableHttpClientTransportConfig::with_uri(self.endpoint.clone())
            .auth_header(bearer_token.to_string());
        let transport = StreamableHttpClientTransport::from_config(config);

        let service = client_info()
            .serve(transport)
            .await
            .map_err(|e| errors::server_unavailable(&self.endpoint, e))?;

        if let Some(server) = service.peer().peer_info() {
            info!(
                server = %server.server_info.name,
                version = %server.server_info.version,
                "Connected to MCP server"
            );
        }

        Ok(Arc::new(RmcpSession {
            endpoint: self.endpoint.clone(),
            service: Mutex::new(Some(service)),
        }))
    }
}

/// Live MCP session. The running service is taken out on close, which makes
/// every later call fail with `MCP_E013` and a repeated close a no-op.
pub struct RmcpSession {
    endpoint: String,
    service: Mutex<Option<RunningService<RoleClient, ClientInfo>>>,
}

impl RmcpSession {
    async fn peer(&self) -> McpResult<Peer<RoleClient>> {
        let guard = self.service.lock().await;
        guard
            .as_ref()
            .map(|service| service.peer().clone())
            .ok_or_else(errors::session_closed)
    }
}

#[async_trait]
impl ToolSession for RmcpSession {
    async fn list_tools(&self) -> McpResult<Vec<RemoteToolInfo>> {
        let peer = self.peer().await?;
        let tools = peer
            .list_all_tools()
            .await
            .map_err(|e| errors::discovery_failed(&self.endpoint, e))?;

        debug!(count = tools.len(), "Discovered MCP tools");

        Ok(tools
            .into_iter()
            .map(|tool| RemoteToolInfo {
                name: tool.name.to_string(),
                description: tool.description.unwrap_or_default().to_string(),
                input_schema: serde_json::to_value(&tool.input_schema)
                    .unwrap_or(json!({"type": "object"})),
            })
            .collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<Value> {
        let arguments = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(errors::tool_invocation_failed(
                    name,
                    format!("arguments must be a JSON object, got {other}"),
                ));
            }
        };

        let peer = self.peer().await?;
        let params = CallToolRequestParams {
            name: name.to_string().into(),
            arguments,
            meta: None,
            task: None,
        };

        let result = peer
            .call_tool(params)
            .await
            .map_err(|e| errors::tool_invocation_failed(name, e))?;

        let content: Vec<Value> = result
            .content
            .iter()
            .map(|item| {
                serde_json::to_value(item)
                    .unwrap_or(json!({"type": "text", "text": "<unserializable content>"}))
            })
            .collect();

        if result.is_error.unwrap_or(false) {
            let message = content
                .iter()
                .find_map(|item| item.get("text").and_then(Value::as_str))
                .unwrap_or("unknown error");
            return Err(errors::tool_reported_error(name, message));
        }

        Ok(json!({ "content": content }))
    }

    async fn close(&self) -> McpResult<()> {
        let service = self.service.lock().await.take();
        let Some(service) = service else {
            return Ok(());
        };

        service
            .cancel()
            .await
            .map_err(|e| errors::shutdown_failed(format!("{e:?}")))?;
        info!("Closed MCP session with {}", self.endpoint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_identifies_as_finagent() {
        let info = client_info();
        assert_eq!(info.client_info.name, "finagent");
        assert_eq!(info.client_info.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn connect_to_closed_port_reports_server_unavailable() {
        let connector = RmcpConnector::new("http://127.0.0.1:9/mcp");
        let err = match connector.connect("token").await {
            Ok(_) => panic!("connection to a closed port should fail"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("[MCP_E011]"));
    }
}
