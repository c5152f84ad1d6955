//! Token Stores
//!
//! Two session-keyed stores back the token lifecycle: a refresh-token map
//! that lives for the process lifetime, and an access-token cache whose
//! entries expire. Both are traits so tests and future deployments can
//! substitute their own backing without touching call sites.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Durable-for-process-lifetime refresh token storage.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Retrieve the refresh token for a session.
    async fn get(&self, session_id: &str) -> Result<Option<String>>;

    /// Store (or overwrite) the refresh token for a session.
    async fn set(&self, session_id: &str, token: String) -> Result<()>;

    /// Delete the refresh token for a session.
    async fn delete(&self, session_id: &str) -> Result<bool>;

    /// Whether a refresh token has ever been stored for this session.
    async fn contains(&self, session_id: &str) -> Result<bool>;
}

/// In-memory refresh token store.
#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, String>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn get(&self, session_id: &str) -> Result<Option<String>> {
        Ok(self.tokens.lock().unwrap().get(session_id).cloned())
    }

    async fn set(&self, session_id: &str, token: String) -> Result<()> {
        self.tokens
            .lock()
            .unwrap()
            .insert(session_id.to_string(), token);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<bool> {
        Ok(self.tokens.lock().unwrap().remove(session_id).is_some())
    }

    async fn contains(&self, session_id: &str) -> Result<bool> {
        Ok(self.tokens.lock().unwrap().contains_key(session_id))
    }
}

/// Expiring access token cache.
#[async_trait]
pub trait AccessTokenCache: Send + Sync {
    /// Retrieve a live access token for a session. Expired entries are
    /// treated as absent.
    async fn get(&self, session_id: &str) -> Result<Option<String>>;

    /// Store an access token with a time-to-live.
    async fn put(&self, session_id: &str, token: String, ttl: Duration) -> Result<()>;

    /// Delete the cached token for a session.
    async fn delete(&self, session_id: &str) -> Result<bool>;

    /// Drop every expired entry, returning how many were removed.
    async fn purge_expired(&self) -> Result<usize>;
}

struct CacheEntry {
    token: String,
    expires_at: Instant,
}

/// In-memory access token cache.
///
/// Expiry is enforced on read; a periodic [`purge_expired`] sweep keeps
/// abandoned sessions from pinning dead entries.
///
/// [`purge_expired`]: AccessTokenCache::purge_expired
#[derive(Default)]
pub struct InMemoryAccessTokenCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryAccessTokenCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenCache for InMemoryAccessTokenCache {
    async fn get(&self, session_id: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(session_id) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.token.clone())),
            Some(_) => {
                entries.remove(session_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, session_id: &str, token: String, ttl: Duration) -> Result<()> {
        self.entries.lock().unwrap().insert(
            session_id.to_string(),
            CacheEntry {
                token,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<bool> {
        Ok(self.entries.lock().unwrap().remove(session_id).is_some())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_store_set_get_overwrite() {
        let store = InMemoryRefreshTokenStore::new();
        assert_eq!(store.get("s1").await.unwrap(), None);
        assert!(!store.contains("s1").await.unwrap());

        store.set("s1", "r1".to_string()).await.unwrap();
        assert_eq!(store.get("s1").await.unwrap().as_deref(), Some("r1"));
        assert!(store.contains("s1").await.unwrap());

        store.set("s1", "r2".to_string()).await.unwrap();
        assert_eq!(store.get("s1").await.unwrap().as_deref(), Some("r2"));

        assert!(store.delete("s1").await.unwrap());
        assert!(!store.contains("s1").await.unwrap());
    }

    #[tokio::test]
    async fn test_cache_returns_live_entry() {
        let cache = InMemoryAccessTokenCache::new();
        cache
            .put("s1", "a1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("s1").await.unwrap().as_deref(), Some("a1"));
    }

    #[tokio::test]
    async fn test_cache_drops_expired_entry_on_read() {
        let cache = InMemoryAccessTokenCache::new();
        cache
            .put("s1", "a1".to_string(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(cache.get("s1").await.unwrap(), None);
        // the expired entry is gone, not just hidden
        assert_eq!(cache.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_expired_counts_removals() {
        let cache = InMemoryAccessTokenCache::new();
        cache
            .put("live", "a".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put("dead", "b".to_string(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert_eq!(cache.get("live").await.unwrap().as_deref(), Some("a"));
    }
}
