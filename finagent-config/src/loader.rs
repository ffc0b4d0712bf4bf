//! Builds an [`AgentConfig`] from environment-style key lookups.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::agent::AgentConfig;
use crate::constants::{defaults, env};
use crate::secrets::{AwsSecretsManager, ClientCredentials, SecretSource};

/// Configuration failures. All of them abort startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required ({hint})")]
    Missing {
        key: &'static str,
        hint: &'static str,
    },
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Loads configuration once per process.
///
/// Production code uses [`ConfigLoader::from_env`]; tests feed a map through
/// [`ConfigLoader::from_map`] so no process state is touched.
pub struct ConfigLoader {
    lookup: Lookup,
    secrets: Option<Arc<dyn SecretSource>>,
}

impl ConfigLoader {
    /// Reads the process environment and consults AWS Secrets Manager when
    /// `SECRET_NAME` is set.
    pub fn from_env() -> Self {
        Self {
            lookup: Box::new(|key| std::env::var(key).ok()),
            secrets: Some(Arc::new(AwsSecretsManager)),
        }
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            secrets: None,
        }
    }

    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self::from_lookup(move |key| values.get(key).cloned())
    }

    /// Replace the secret store consulted for client credentials.
    pub fn with_secret_source(mut self, source: Arc<dyn SecretSource>) -> Self {
        self.secrets = Some(source);
        self
    }

    /// Trimmed value for `key`; blank values count as absent.
    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Load and validate the configuration.
    ///
    /// With `SECRET_NAME` set, client credentials come from the secret only
    /// if it carries `MCP_CLIENT_ID` or `MCP_CLIENT_SECRET`; a secret holding
    /// just other keys (or a failed lookup) falls back to the environment
    /// instead of failing. A secret with only one of the two keys does not
    /// borrow the other from the environment and fails as missing.
    pub async fn load(&self) -> Result<AgentConfig, ConfigError> {
        let aws_region = self
            .var(env::AWS_DEFAULT_REGION)
            .unwrap_or_else(|| defaults::AWS_REGION.to_string());

        let credentials = self.credentials(&aws_region).await;

        let auth_server_token_url = self.var(env::AUTH_SERVER_TOKEN_URL).ok_or(
            ConfigError::Missing {
                key: env::AUTH_SERVER_TOKEN_URL,
                hint: "environment variable",
            },
        )?;
        validate_url(env::AUTH_SERVER_TOKEN_URL, &auth_server_token_url)?;

        let mcp_client_id = credentials.client_id.ok_or(ConfigError::Missing {
            key: env::MCP_CLIENT_ID,
            hint: "from SECRET_NAME or environment",
        })?;
        let mcp_client_secret = credentials.client_secret.ok_or(ConfigError::Missing {
            key: env::MCP_CLIENT_SECRET,
            hint: "from SECRET_NAME or environment",
        })?;

        let finance_mcp_url = self
            .var(env::FINANCE_MCP_URL)
            .unwrap_or_else(|| defaults::FINANCE_MCP_URL.to_string());
        validate_url(env::FINANCE_MCP_URL, &finance_mcp_url)?;

        let max_agent_turns = match self.var(env::AGENT_MAX_TURNS) {
            Some(raw) => parse_turns(&raw)?,
            None => defaults::MAX_AGENT_TURNS,
        };

        let bind_raw = self
            .var(env::AGENT_BIND_ADDR)
            .unwrap_or_else(|| defaults::BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw.parse().map_err(|err: std::net::AddrParseError| {
            ConfigError::Invalid {
                key: env::AGENT_BIND_ADDR,
                value: bind_raw.clone(),
                reason: err.to_string(),
            }
        })?;

        let config = AgentConfig {
            model_id: self
                .var(env::BEDROCK_MODEL_ID)
                .unwrap_or_else(|| defaults::MODEL_ID.to_string()),
            finance_mcp_url,
            auth_server_token_url,
            mcp_client_id,
            mcp_client_secret,
            token_scope: self
                .var(env::MCP_TOKEN_SCOPE)
                .unwrap_or_else(|| defaults::TOKEN_SCOPE.to_string()),
            aws_region,
            workspace_root: PathBuf::from(
                self.var(env::AGENT_WORKSPACE)
                    .unwrap_or_else(|| defaults::WORKSPACE.to_string()),
            ),
            max_agent_turns,
            bind_addr,
        };

        debug!(config = ?config, "Agent configuration loaded");
        Ok(config)
    }

    /// Secret store first (when `SECRET_NAME` is set), environment otherwise.
    ///
    /// A secret that loads with at least one credential key wins outright;
    /// lookup failures and empty secrets fall back to the environment.
    async fn credentials(&self, region: &str) -> ClientCredentials {
        if let (Some(secret_name), Some(source)) = (self.var(env::SECRET_NAME), &self.secrets) {
            match source.fetch(&secret_name, region).await {
                Ok(Some(creds)) if !creds.is_empty() => {
                    info!(secret = %secret_name, "Loaded MCP client credentials from secret store");
                    return creds;
                }
                Ok(_) => {
                    warn!(
                        secret = %secret_name,
                        "Secret carried no MCP client credentials; using environment"
                    );
                }
                Err(err) => {
                    warn!(
                        secret = %secret_name,
                        error = %format!("{err:#}"),
                        "Secret store lookup failed; using environment"
                    );
                }
            }
        }

        ClientCredentials {
            client_id: self.var(env::MCP_CLIENT_ID),
            client_secret: self.var(env::MCP_CLIENT_SECRET),
        }
    }
}

fn validate_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value).map_err(|err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: err.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn parse_turns(raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(turns) if turns > 0 => Ok(turns),
        Ok(_) => Err(ConfigError::Invalid {
            key: env::AGENT_MAX_TURNS,
            value: raw.to_string(),
            reason: "must be at least 1".to_string(),
        }),
        Err(err) => Err(ConfigError::Invalid {
            key: env::AGENT_MAX_TURNS,
            value: raw.to_string(),
            reason: err.to_string(),
        }),
    }
}
