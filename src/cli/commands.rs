use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use finagent_config::{AgentConfig, ConfigLoader};
use finagent_core::server;
use finagent_core::{AppContext, InvocationHandler, InvocationRequest};

async fn load_config() -> Result<AgentConfig> {
    ConfigLoader::from_env()
        .load()
        .await
        .context("Invalid configuration")
}

async fn build_handler(config: AgentConfig) -> Result<InvocationHandler> {
    let context = AppContext::from_config(config)
        .await
        .context("Failed to initialize agent context")?;
    Ok(InvocationHandler::new(Arc::new(context)))
}

pub async fn handle_serve(bind: Option<SocketAddr>) -> Result<()> {
    let config = load_config().await?;
    let addr = bind.unwrap_or(config.bind_addr);
    let handler = build_handler(config).await?;
    server::serve(handler, addr).await
}

pub async fn handle_invoke(prompt: Option<String>) -> Result<()> {
    let config = load_config().await?;
    let handler = build_handler(config).await?;
    let response = handler.invoke(InvocationRequest { prompt }).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub async fn handle_check_config() -> Result<()> {
    let config = load_config().await?;
    println!("{}", serde_json::to_string_pretty(&config.redacted_summary())?);
    Ok(())
}
