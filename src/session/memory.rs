//! In-memory session store.
//!
//! Tokens live in two `DashMap`s for the lifetime of the process. Expiry
//! checks go through the entry API so check-then-delete holds the shard
//! lock for that key; refresh rotation removes the token first, so only
//! one concurrent caller can consume it.
//!
//! Rotation and revocation of the same user serialize on a per-user lock:
//! the consumed refresh token and the pair that replaces it are either both
//! visible to `revoke_all` or neither is.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::SessionConfig;
use crate::observability::metrics;
use crate::session::store::{SessionError, SessionStore, SessionSummary, TokenBundle};

const TOKEN_LEN: usize = 48;

#[derive(Debug, Clone)]
struct TokenRecord {
    user_id: String,
    expires_at: Instant,
}

impl TokenRecord {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Random token from the OS CSPRNG.
fn generate_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub struct MemorySessionStore {
    access: DashMap<String, TokenRecord>,
    refresh: DashMap<String, TokenRecord>,
    user_locks: DashMap<String, Arc<Mutex<()>>>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            access: DashMap::new(),
            refresh: DashMap::new(),
            user_locks: DashMap::new(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            Duration::from_secs(config.access_ttl_secs),
            Duration::from_secs(config.refresh_ttl_secs),
        )
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks.entry(user_id.to_string()).or_default().clone()
    }

    fn issue_pair(&self, user_id: &str) -> Result<TokenBundle, SessionError> {
        let now = Instant::now();
        let access_expires = now.checked_add(self.access_ttl);
        let refresh_expires = now.checked_add(self.refresh_ttl);
        let (Some(access_expires), Some(refresh_expires)) = (access_expires, refresh_expires) else {
            tracing::error!(
                access_ttl_secs = self.access_ttl.as_secs(),
                refresh_ttl_secs = self.refresh_ttl.as_secs(),
                "Token lifetime overflows the clock"
            );
            return Err(SessionError::ExpiryOverflow);
        };

        let access_token = generate_token();
        let refresh_token = generate_token();

        self.access.insert(
            access_token.clone(),
            TokenRecord {
                user_id: user_id.to_string(),
                expires_at: access_expires,
            },
        );
        self.refresh.insert(
            refresh_token.clone(),
            TokenRecord {
                user_id: user_id.to_string(),
                expires_at: refresh_expires,
            },
        );
        metrics::record_active_sessions(self.access.len());

        Ok(TokenBundle {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl.as_secs(),
        })
    }

    fn retain_counting<F>(map: &DashMap<String, TokenRecord>, mut keep: F) -> usize
    where
        F: FnMut(&TokenRecord) -> bool,
    {
        let mut removed = 0;
        map.retain(|_, record| {
            let kept = keep(record);
            if !kept {
                removed += 1;
            }
            kept
        });
        removed
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn issue(&self, user_id: &str) -> Result<TokenBundle, SessionError> {
        metrics::record_session_event("issue");
        self.issue_pair(user_id)
    }

    async fn resolve(&self, access_token: &str) -> Option<String> {
        match self.access.entry(access_token.to_string()) {
            Entry::Occupied(entry) => {
                if entry.get().is_expired(Instant::now()) {
                    entry.remove();
                    metrics::record_session_event("expired");
                    None
                } else {
                    Some(entry.get().user_id.clone())
                }
            }
            Entry::Vacant(_) => None,
        }
    }

    async fn rotate(&self, refresh_token: &str) -> Result<TokenBundle, SessionError> {
        let user_id = self
            .refresh
            .get(refresh_token)
            .map(|record| record.user_id.clone())
            .ok_or(SessionError::InvalidToken)?;

        let lock = self.user_lock(&user_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // A revoke that finished before we got the lock already took it.
        let (_, record) = self
            .refresh
            .remove(refresh_token)
            .ok_or(SessionError::InvalidToken)?;
        if record.is_expired(Instant::now()) {
            metrics::record_session_event("expired");
            return Err(SessionError::InvalidToken);
        }
        metrics::record_session_event("rotate");
        self.issue_pair(&record.user_id)
    }

    async fn revoke_all(&self, user_id: &str) -> usize {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let removed = Self::retain_counting(&self.access, |r| r.user_id != user_id)
            + Self::retain_counting(&self.refresh, |r| r.user_id != user_id);
        metrics::record_session_event("revoke");
        metrics::record_active_sessions(self.access.len());
        removed
    }

    async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let removed = Self::retain_counting(&self.access, |r| !r.is_expired(now))
            + Self::retain_counting(&self.refresh, |r| !r.is_expired(now));
        metrics::record_active_sessions(self.access.len());
        removed
    }

    async fn summary(&self) -> SessionSummary {
        let now = Instant::now();
        let mut summary = SessionSummary::default();
        for entry in self.access.iter() {
            if entry.value().is_expired(now) {
                summary.expired += 1;
            } else {
                summary.access_tokens += 1;
            }
        }
        for entry in self.refresh.iter() {
            if entry.value().is_expired(now) {
                summary.expired += 1;
            } else {
                summary.refresh_tokens += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn store() -> MemorySessionStore {
        MemorySessionStore::from_config(&SessionConfig::default())
    }

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let store = store();
        let bundle = store.issue("u-1").await.unwrap();

        assert_eq!(bundle.token_type, "Bearer");
        assert_eq!(bundle.expires_in, 3600);
        assert_eq!(bundle.access_token.len(), TOKEN_LEN);
        assert_ne!(bundle.access_token, bundle.refresh_token);
        assert_eq!(store.resolve(&bundle.access_token).await.as_deref(), Some("u-1"));
        // refresh tokens are not access tokens
        assert_eq!(store.resolve(&bundle.refresh_token).await, None);
        assert_eq!(store.resolve("nope").await, None);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = store();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let bundle = store.issue("u-1").await.unwrap();
            assert!(seen.insert(bundle.access_token));
            assert!(seen.insert(bundle.refresh_token));
        }
    }

    #[tokio::test]
    async fn test_expired_access_token_is_deleted_on_lookup() {
        let store = MemorySessionStore::new(Duration::ZERO, Duration::from_secs(60));
        let bundle = store.issue("u-1").await.unwrap();

        assert_eq!(store.resolve(&bundle.access_token).await, None);
        assert_eq!(store.summary().await.access_tokens, 0);
        assert_eq!(store.summary().await.expired, 0);
    }

    #[tokio::test]
    async fn test_rotate_consumes_refresh_token() {
        let store = store();
        let first = store.issue("u-7").await.unwrap();

        let second = store.rotate(&first.refresh_token).await.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);
        assert_eq!(store.resolve(&second.access_token).await.as_deref(), Some("u-7"));

        // replay is rejected
        assert_eq!(store.rotate(&first.refresh_token).await, Err(SessionError::InvalidToken));
        assert!(store.rotate(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_refresh_token_cannot_rotate() {
        let store = MemorySessionStore::new(Duration::from_secs(60), Duration::ZERO);
        let bundle = store.issue("u-1").await.unwrap();
        assert!(store.rotate(&bundle.refresh_token).await.is_err());
        assert_eq!(store.summary().await.refresh_tokens, 0);
    }

    #[tokio::test]
    async fn test_concurrent_rotation_has_single_winner() {
        let store = Arc::new(store());
        let bundle = store.issue("u-1").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let token = bundle.refresh_token.clone();
            handles.push(tokio::spawn(async move { store.rotate(&token).await.is_ok() }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_revoke_all_only_touches_one_user() {
        let store = store();
        let a1 = store.issue("alice").await.unwrap();
        let a2 = store.issue("alice").await.unwrap();
        let b = store.issue("bob").await.unwrap();

        assert_eq!(store.revoke_all("alice").await, 4);
        assert_eq!(store.resolve(&a1.access_token).await, None);
        assert!(store.rotate(&a2.refresh_token).await.is_err());
        assert_eq!(store.resolve(&b.access_token).await.as_deref(), Some("bob"));
        assert_eq!(store.revoke_all("nobody").await, 0);
    }

    #[tokio::test]
    async fn test_purge_and_summary() {
        let store = MemorySessionStore::new(Duration::ZERO, Duration::from_secs(60));
        store.issue("u-1").await.unwrap();
        store.issue("u-2").await.unwrap();

        let summary = store.summary().await;
        assert_eq!(summary.access_tokens, 0);
        assert_eq!(summary.refresh_tokens, 2);
        assert_eq!(summary.expired, 2);

        assert_eq!(store.purge_expired().await, 2);
        assert_eq!(store.summary().await.expired, 0);
        assert_eq!(store.summary().await.refresh_tokens, 2);
    }

    #[tokio::test]
    async fn test_lifetime_overflow_is_an_error() {
        let store = MemorySessionStore::new(Duration::from_secs(60), Duration::from_secs(u64::MAX));
        assert_eq!(store.issue("u-1").await, Err(SessionError::ExpiryOverflow));
        assert_eq!(store.summary().await, SessionSummary::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_logout_racing_refresh_leaves_no_tokens() {
        for _ in 0..2000 {
            let store = Arc::new(store());
            let bundle = store.issue("u-1").await.unwrap();

            let rotating = {
                let store = store.clone();
                tokio::spawn(async move { store.rotate(&bundle.refresh_token).await })
            };
            let revoking = {
                let store = store.clone();
                tokio::spawn(async move { store.revoke_all("u-1").await })
            };
            let rotated = rotating.await.unwrap();
            revoking.await.unwrap();

            assert_eq!(store.summary().await, SessionSummary::default());
            // rotation that ran first had its output swept by the revoke
            if let Ok(pair) = rotated {
                assert_eq!(store.resolve(&pair.access_token).await, None);
            }
        }
    }
}
