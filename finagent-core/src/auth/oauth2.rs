use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use finagent_config::AgentConfig;
use finagent_config::constants::auth::{DEFAULT_TOKEN_LIFETIME_SECS, GRANT_TYPE};
use serde::Deserialize;
use tracing::{debug, info};

use super::{AuthError, TokenSnapshot, TokenSource};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Obtains and caches OAuth2 tokens via the client-credentials grant.
///
/// The cache is a single [`TokenSnapshot`] behind an [`ArcSwapOption`]:
/// reads are lock-free and a refresh swaps in a complete new snapshot.
/// Refreshes are not coordinated, so two callers racing past expiry may
/// both hit the token endpoint; each exchange is independent and harmless.
pub struct OAuth2TokenProvider {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cached: ArcSwapOption<TokenSnapshot>,
}

impl OAuth2TokenProvider {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::with_client(
            reqwest::Client::new(),
            token_url,
            client_id,
            client_secret,
            scope,
        )
    }

    pub fn with_client(
        http: reqwest::Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into(),
            cached: ArcSwapOption::empty(),
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            config.auth_server_token_url.clone(),
            config.mcp_client_id.clone(),
            config.mcp_client_secret.clone(),
            config.token_scope.clone(),
        )
    }

    /// Return a valid access token, exchanging credentials only when the
    /// cached one is missing or inside the refresh margin.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        if let Some(snapshot) = self.cached.load_full()
            && snapshot.is_valid_at(Instant::now())
        {
            return Ok(snapshot.token().to_string());
        }

        let snapshot = self.exchange().await?;
        let token = snapshot.token().to_string();
        self.cached.store(Some(Arc::new(snapshot)));
        Ok(token)
    }

    /// Current cached snapshot, if any, regardless of freshness.
    pub fn cached(&self) -> Option<Arc<TokenSnapshot>> {
        self.cached.load_full()
    }

    async fn exchange(&self) -> Result<TokenSnapshot, AuthError> {
        debug!(url = %self.token_url, "Requesting client-credentials token");
        let issued_at = Instant::now();

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", GRANT_TYPE), ("scope", self.scope.as_str())])
            .send()
            .await
            .map_err(|source| AuthError::Request {
                url: self.token_url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| AuthError::Request {
            url: self.token_url.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|err| AuthError::MalformedResponse(err.to_string()))?;
        if parsed.access_token.is_empty() {
            return Err(AuthError::MalformedResponse(
                "access_token is empty".to_string(),
            ));
        }

        let lifetime = parsed.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        info!(expires_in = lifetime, "Obtained client-credentials token");

        Ok(TokenSnapshot::new(
            parsed.access_token,
            issued_at,
            Duration::from_secs(lifetime),
        ))
    }
}

#[async_trait]
impl TokenSource for OAuth2TokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        self.get_token().await
    }
}

impl std::fmt::Debug for OAuth2TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2TokenProvider")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
