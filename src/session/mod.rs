//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! POST login
//!     → users.rs (identifier + secret → profile)
//!     → store.rs SessionStore::issue (access + refresh token)
//!
//! Bearer request → SessionStore::resolve (expiry checked, expired deleted)
//! POST refresh   → SessionStore::rotate (old refresh consumed, new pair)
//! POST logout    → SessionStore::revoke_all
//!
//! Background sweeper → SessionStore::purge_expired
//! ```
//!
//! # Design Decisions
//! - Tokens are opaque random strings, not self-describing JWTs
//! - The trait is async so a shared cache can back it later
//! - The in-memory store lives as long as the process

pub mod memory;
pub mod store;
pub mod users;

pub use memory::MemorySessionStore;
pub use store::{SessionError, SessionState, SessionStore, SessionSummary, TokenBundle};
pub use users::{UserDirectory, UserProfile, UserRecord};

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

/// Periodically purge expired tokens until shutdown.
pub async fn run_sweeper(store: SessionState, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
    if interval.is_zero() {
        tracing::info!("Session sweeper disabled");
        return;
    }

    let mut ticker = time::interval(interval);
    // first tick fires immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = store.purge_expired().await;
                if removed > 0 {
                    tracing::debug!(removed, "Purged expired tokens");
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Session sweeper received shutdown signal, exiting loop");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_and_stops() {
        let store = Arc::new(MemorySessionStore::new(Duration::ZERO, Duration::ZERO));
        store.issue("u-1").await.unwrap();
        assert_eq!(store.summary().await.expired, 2);

        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(run_sweeper(store.clone(), Duration::from_secs(5), rx));

        time::sleep(Duration::from_secs(6)).await;
        assert_eq!(store.summary().await.expired, 0);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
