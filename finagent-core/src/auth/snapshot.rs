use std::time::{Duration, Instant};

use finagent_config::constants::auth::TOKEN_REFRESH_MARGIN_SECS;

/// Immutable view of one issued access token.
///
/// The provider replaces the whole snapshot on refresh instead of mutating
/// token and expiry separately, so a reader never observes a token paired
/// with another token's expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSnapshot {
    token: String,
    refresh_at: Instant,
}

impl TokenSnapshot {
    /// Snapshot for a token issued at `issued_at` that the server says lives
    /// for `lifetime`. The safety margin is subtracted here, saturating so a
    /// lifetime shorter than the margin yields an already-stale snapshot.
    pub fn new(token: impl Into<String>, issued_at: Instant, lifetime: Duration) -> Self {
        let margin = Duration::from_secs(TOKEN_REFRESH_MARGIN_SECS);
        Self {
            token: token.into(),
            refresh_at: issued_at + lifetime.saturating_sub(margin),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn refresh_at(&self) -> Instant {
        self.refresh_at
    }

    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.refresh_at
    }
}

impl std::fmt::Debug for TokenSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSnapshot")
            .field("token", &"<redacted>")
            .field("refresh_at", &self.refresh_at)
            .finish()
    }
}
