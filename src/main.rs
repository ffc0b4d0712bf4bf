//! finagent - finance assistant agent runtime
//!
//! Thin binary entry point that delegates to the CLI handlers.

use anyhow::Result;
use clap::Parser;
use finagent_config::load_dotenv;

mod cli;
mod main_helpers;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (non-fatal if missing)
    load_dotenv().ok();

    let args = Cli::parse();
    main_helpers::initialize_tracing(args.log_format)?;

    match args.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => cli::handle_serve(bind).await,
        Commands::Invoke { prompt } => cli::handle_invoke(prompt).await,
        Commands::CheckConfig => cli::handle_check_config().await,
    }
}
