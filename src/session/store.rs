//! Session store interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Token pair returned after login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown, expired or already used token")]
    InvalidToken,

    #[error("token lifetime does not fit the clock")]
    ExpiryOverflow,
}

/// Counts of stored tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub access_tokens: usize,
    pub refresh_tokens: usize,
    /// Entries past their expiry that have not been purged yet.
    pub expired: usize,
}

/// Opaque bearer token storage.
///
/// Implementations must check expiry before returning a hit, and
/// `rotate` must consume the refresh token it is given so it cannot be
/// replayed. A pair issued by a `rotate` that overlaps `revoke_all` for
/// the same user must not survive the revocation.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issue a fresh access/refresh pair for the user.
    async fn issue(&self, user_id: &str) -> Result<TokenBundle, SessionError>;

    /// User id owning a live access token.
    async fn resolve(&self, access_token: &str) -> Option<String>;

    /// Exchange a live refresh token for a new pair.
    async fn rotate(&self, refresh_token: &str) -> Result<TokenBundle, SessionError>;

    /// Drop every token of the user. Returns how many were removed.
    async fn revoke_all(&self, user_id: &str) -> usize;

    /// Drop expired entries. Returns how many were removed.
    async fn purge_expired(&self) -> usize;

    async fn summary(&self) -> SessionSummary;
}

/// Shared handle used by handlers and background tasks.
pub type SessionState = Arc<dyn SessionStore>;
