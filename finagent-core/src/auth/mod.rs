//! OAuth2 client-credentials authentication for the finance MCP server.
//!
//! [`OAuth2TokenProvider`] exchanges the configured client id/secret for a
//! bearer token and caches it until shortly before it expires. The handler
//! only sees the [`TokenSource`] trait, which keeps it testable without a
//! token endpoint.

mod oauth2;
mod snapshot;

pub use oauth2::OAuth2TokenProvider;
pub use snapshot::TokenSnapshot;

use async_trait::async_trait;
use thiserror::Error;

/// Token exchange failures. These only ever trigger the local-only fallback;
/// they are never retried within a request.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("token endpoint rejected client credentials (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("token endpoint returned an unusable response: {0}")]
    MalformedResponse(String),
}

/// Anything that can hand out a bearer token for the tool server.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self) -> Result<String, AuthError>;
}
