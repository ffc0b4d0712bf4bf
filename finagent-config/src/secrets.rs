//! Secret store lookups for OAuth2 client credentials.
//!
//! AWS deployments keep `MCP_CLIENT_ID` / `MCP_CLIENT_SECRET` in a JSON
//! secret. The lookup is best effort: the loader falls back to environment
//! variables whenever the store is unreachable or the secret is missing.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use serde::Deserialize;

use crate::constants::secrets::{CLIENT_ID_KEY, CLIENT_SECRET_KEY};

/// Client credentials read from a secret store.
///
/// Either field may be absent; the loader reports which one is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientCredentials {
    #[serde(rename = "MCP_CLIENT_ID", default)]
    pub client_id: Option<String>,
    #[serde(rename = "MCP_CLIENT_SECRET", default)]
    pub client_secret: Option<String>,
}

impl ClientCredentials {
    /// Parse the JSON document stored in the secret.
    pub fn from_secret_string(secret: &str) -> Result<Self> {
        let parsed: Self = serde_json::from_str(secret).with_context(|| {
            format!("Secret is not a JSON object with {CLIENT_ID_KEY}/{CLIENT_SECRET_KEY} keys")
        })?;
        Ok(Self {
            client_id: non_blank(parsed.client_id),
            client_secret: non_blank(parsed.client_secret),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.client_id.is_none() && self.client_secret.is_none()
    }
}

/// Source of client credentials keyed by secret name.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Returns `Ok(None)` when the secret exists but carries no string payload.
    async fn fetch(&self, secret_name: &str, region: &str) -> Result<Option<ClientCredentials>>;
}

/// [`SecretSource`] backed by AWS Secrets Manager.
///
/// Credentials for the SDK itself resolve through the standard AWS chain
/// (environment, shared config, instance or task role).
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsSecretsManager;

#[async_trait]
impl SecretSource for AwsSecretsManager {
    async fn fetch(&self, secret_name: &str, region: &str) -> Result<Option<ClientCredentials>> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        let client = aws_sdk_secretsmanager::Client::new(&sdk_config);

        let output = client
            .get_secret_value()
            .secret_id(secret_name)
            .send()
            .await
            .map_err(|err| {
                anyhow!(
                    "Secrets Manager lookup for '{}' failed: {}",
                    secret_name,
                    DisplayErrorContext(&err)
                )
            })?;

        match output.secret_string() {
            Some(secret) => ClientCredentials::from_secret_string(secret).map(Some),
            None => Ok(None),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
