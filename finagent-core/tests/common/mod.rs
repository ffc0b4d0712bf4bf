#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use finagent_config::constants::env;
use finagent_config::{AgentConfig, ConfigLoader};
use finagent_core::AppContext;
use finagent_core::auth::{AuthError, TokenSource};
use finagent_core::llm::{
    ContentBlock, Message, ModelClient, ModelRequest, ModelResponse, Role, StopReason, ToolUse,
};
use finagent_core::mcp::{McpResult, RemoteToolInfo, ToolServerConnector, ToolSession, errors};
use finagent_core::tools::{ToolRegistry, Workspace, file_tools};
use serde_json::{Value, json};
use tempfile::TempDir;

pub async fn config(workspace: &TempDir) -> AgentConfig {
    ConfigLoader::from_map(HashMap::from([
        (
            env::AUTH_SERVER_TOKEN_URL.to_string(),
            "http://127.0.0.1:9/token".to_string(),
        ),
        (env::MCP_CLIENT_ID.to_string(), "client".to_string()),
        (env::MCP_CLIENT_SECRET.to_string(), "secret".to_string()),
        (
            env::AGENT_WORKSPACE.to_string(),
            workspace.path().display().to_string(),
        ),
    ]))
    .load()
    .await
    .expect("test configuration is valid")
}

pub struct StaticToken;

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        Ok("test-token".to_string())
    }
}

pub struct RejectingToken;

#[async_trait]
impl TokenSource for RejectingToken {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        Err(AuthError::Rejected {
            status: 401,
            body: "invalid_client".to_string(),
        })
    }
}

#[derive(Default)]
pub struct MockSession {
    pub tools: Vec<RemoteToolInfo>,
    pub fail_discovery: bool,
    pub closes: AtomicUsize,
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl MockSession {
    pub fn with_tools(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            tools: names
                .iter()
                .map(|name| RemoteToolInfo {
                    name: name.to_string(),
                    description: format!("remote {name}"),
                    input_schema: json!({"type": "object"}),
                })
                .collect(),
            ..Default::default()
        })
    }

    pub fn failing_discovery() -> Arc<Self> {
        Arc::new(Self {
            fail_discovery: true,
            ..Default::default()
        })
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolSession for MockSession {
    async fn list_tools(&self) -> McpResult<Vec<RemoteToolInfo>> {
        if self.fail_discovery {
            return Err(errors::discovery_failed("mock://finance", "connection reset"));
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.clone()));
        Ok(json!({"content": [{"type": "text", "text": format!("{name} ok")}]}))
    }

    async fn close(&self) -> McpResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub enum MockConnector {
    Session(Arc<MockSession>),
    Refused,
}

#[async_trait]
impl ToolServerConnector for MockConnector {
    async fn connect(&self, bearer_token: &str) -> McpResult<Arc<dyn ToolSession>> {
        assert_eq!(bearer_token, "test-token");
        match self {
            MockConnector::Session(session) => Ok(session.clone()),
            MockConnector::Refused => Err(errors::server_unavailable(
                "mock://finance",
                "connection refused",
            )),
        }
    }
}

/// Model that replays canned responses and records what it was sent.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<ModelResponse>>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system_prompt: String,
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ModelResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(vec![final_answer(text)])
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn converse(&self, request: ModelRequest<'_>) -> Result<ModelResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system_prompt: request.system_prompt.to_string(),
            messages: request.messages.to_vec(),
            tool_names: request.tools.iter().map(|tool| tool.name.clone()).collect(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("model unavailable"))
    }
}

pub fn final_answer(text: &str) -> ModelResponse {
    ModelResponse {
        message: Message::assistant_text(text),
        stop_reason: StopReason::EndTurn,
    }
}

pub fn tool_call(id: &str, name: &str, input: Value) -> ModelResponse {
    ModelResponse {
        message: Message::new(
            Role::Assistant,
            vec![ContentBlock::ToolUse(ToolUse {
                tool_use_id: id.to_string(),
                name: name.to_string(),
                input,
            })],
        ),
        stop_reason: StopReason::ToolUse,
    }
}

pub fn local_tools(workspace: &TempDir) -> ToolRegistry {
    file_tools(Workspace::new(workspace.path()).unwrap()).unwrap()
}

pub async fn context(
    workspace: &TempDir,
    tokens: Arc<dyn TokenSource>,
    connector: MockConnector,
    model: Arc<ScriptedModel>,
) -> Arc<AppContext> {
    Arc::new(AppContext::new(
        config(workspace).await,
        tokens,
        Arc::new(connector),
        model,
        local_tools(workspace),
    ))
}
