//! Configuration loading for the finagent runtime.
//!
//! The agent is configured once per process. Values come from the process
//! environment (optionally seeded from a `.env` file) and, when `SECRET_NAME`
//! is set, the OAuth2 client credentials are read from AWS Secrets Manager
//! first with the environment as fallback.
//!
//! ```rust,ignore
//! use finagent_config::{ConfigLoader, load_dotenv};
//!
//! load_dotenv()?;
//! let config = ConfigLoader::from_env().load().await?;
//! println!("serving model {}", config.model_id);
//! ```

pub mod constants;
pub mod loader;
pub mod secrets;

mod agent;
mod dotenv;

pub use agent::AgentConfig;
pub use dotenv::load_dotenv;
pub use loader::{ConfigError, ConfigLoader};
pub use secrets::{AwsSecretsManager, ClientCredentials, SecretSource};
