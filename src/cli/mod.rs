//! Command-line surface of the `finagent` binary.

mod commands;

use std::net::SocketAddr;

use clap::{Parser, Subcommand, ValueEnum};

pub use commands::{handle_check_config, handle_invoke, handle_serve};

#[derive(Debug, Parser)]
#[command(
    name = "finagent",
    version,
    about = "Finance assistant agent with remote MCP tools and a local-only fallback"
)]
pub struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Serve `/invocations` and `/ping` over HTTP (default)
    Serve {
        /// Address to bind, overriding AGENT_BIND_ADDR
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Run a single prompt and print the JSON response
    Invoke {
        #[arg(long, short)]
        prompt: Option<String>,
    },
    /// Load and validate configuration, then print it with secrets masked
    CheckConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
