use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::shared::errors::AppResult;

/// Cached access token with TTL support
#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    acquired_at: Instant,
    ttl: Duration,
}

impl CachedToken {
    fn is_expired(&self, margin: Duration) -> bool {
        self.acquired_at.elapsed() + margin >= self.ttl
    }
}

/// Explicit access-token cache for a catalog client.
///
/// The owning collaborator injects this next to its HTTP client and supplies
/// the refresh future; nothing here is ambient module state. The refresh
/// margin makes the cache hand out a new token slightly before the old one
/// actually expires, so an in-flight request never crosses the expiry.
#[derive(Debug)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
    refresh_margin: Duration,
}

impl TokenCache {
    pub fn new(refresh_margin: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            refresh_margin,
        }
    }

    /// Return the cached token, refreshing through `refresh` when the slot is
    /// empty or inside the expiry margin. `refresh` yields the new token and
    /// its lifetime as reported by the auth endpoint.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> AppResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<(String, Duration)>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if !cached.is_expired(self.refresh_margin) {
                return Ok(cached.token.clone());
            }
            log::debug!("Access token expired, refreshing");
        }

        let (token, ttl) = refresh().await?;
        *slot = Some(CachedToken {
            token: token.clone(),
            acquired_at: Instant::now(),
            ttl,
        });

        Ok(token)
    }

    /// Drop the cached token so the next call refreshes unconditionally,
    /// e.g. after the catalog rejects it early.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}
