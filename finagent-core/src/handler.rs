use std::sync::Arc;

use anyhow::anyhow;
use finagent_config::constants::defaults;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agent::{Agent, AgentError, prompts};
use crate::context::AppContext;
use crate::llm::Message;
use crate::mcp::ToolSession;
use crate::tools::{RemoteTool, ToolRegistry};

/// Body of `POST /invocations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl InvocationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
        }
    }

    /// The supplied prompt, or the default greeting when absent.
    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or(defaults::PROMPT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub result: Message,
}

/// Outcome of trying to reach the finance tool server for one request.
pub enum SessionSetup {
    /// Connected and tools discovered. The session must be closed.
    Remote {
        session: Arc<dyn ToolSession>,
        tools: ToolRegistry,
    },
    /// Token, connect or discovery failed.
    LocalOnly { cause: anyhow::Error },
}

/// Runs one prompt per call against the remote+local agent, falling back to
/// a local-only agent when the tool server cannot be used.
#[derive(Clone)]
pub struct InvocationHandler {
    context: Arc<AppContext>,
}

impl InvocationHandler {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    pub async fn invoke(
        &self,
        request: InvocationRequest,
    ) -> Result<InvocationResponse, AgentError> {
        let prompt = request.prompt();

        let result = match self.prepare_session().await {
            SessionSetup::Remote { session, tools } => {
                info!(tools = tools.len(), "Running agent with remote tools");
                let outcome = self
                    .agent(tools, prompts::FINANCE_AND_FILE_TOOLS)
                    .run(prompt)
                    .await;
                close_session(session.as_ref()).await;
                outcome?
            }
            SessionSetup::LocalOnly { cause } => {
                warn!(
                    error = %format!("{cause:#}"),
                    "Could not use finance MCP server; continuing with local tools only"
                );
                self.agent(self.context.local_tools.clone(), prompts::FILE_TOOLS_ONLY)
                    .run(prompt)
                    .await?
            }
        };

        Ok(InvocationResponse { result })
    }

    /// Obtain a token, connect and discover tools. Never fails: every
    /// tool-server problem becomes [`SessionSetup::LocalOnly`].
    pub async fn prepare_session(&self) -> SessionSetup {
        let token = match self.context.tokens.bearer_token().await {
            Ok(token) => token,
            Err(err) => {
                return SessionSetup::LocalOnly {
                    cause: anyhow!(err).context("Failed to obtain access token"),
                };
            }
        };

        let session = match self.context.connector.connect(&token).await {
            Ok(session) => session,
            Err(cause) => return SessionSetup::LocalOnly { cause },
        };

        let remote = match session.list_tools().await {
            Ok(remote) => remote,
            Err(cause) => {
                close_session(session.as_ref()).await;
                return SessionSetup::LocalOnly { cause };
            }
        };

        SessionSetup::Remote {
            tools: self.combined_tools(remote, &session),
            session,
        }
    }

    fn combined_tools(
        &self,
        remote: Vec<crate::mcp::RemoteToolInfo>,
        session: &Arc<dyn ToolSession>,
    ) -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        for info in remote {
            let name = info.name.clone();
            if let Err(err) = tools.register(Arc::new(RemoteTool::new(info, session.clone()))) {
                warn!(tool = %name, error = %err, "Skipping remote tool");
            }
        }
        for name in self.context.local_tools.names() {
            if let Some(tool) = self.context.local_tools.get(&name)
                && let Err(err) = tools.register(tool)
            {
                warn!(tool = %name, error = %err, "Local tool shadowed by remote tool");
            }
        }
        tools
    }

    fn agent(&self, tools: ToolRegistry, system_prompt: &str) -> Agent {
        Agent::new(self.context.model.clone(), tools, system_prompt)
            .with_max_turns(self.context.config.max_agent_turns)
    }
}

async fn close_session(session: &dyn ToolSession) {
    if let Err(err) = session.close().await {
        warn!(error = %format!("{err:#}"), "Failed to close MCP session");
    }
}
