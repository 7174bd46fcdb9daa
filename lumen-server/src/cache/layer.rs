//! Read-through cache layer
//!
//! Cache-aside over the catalog. The cache is an optimization only: every
//! backend error or timeout is logged and treated as a miss, so a broken
//! cache never fails a request.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::keys;
use super::kv::{KvError, KvStore, bounded};

#[derive(Clone)]
pub struct CacheLayer {
    kv: Arc<dyn KvStore>,
    timeout: Duration,
}

impl std::fmt::Debug for CacheLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheLayer")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CacheLayer {
    pub fn new(kv: Arc<dyn KvStore>, timeout: Duration) -> Self {
        Self { kv, timeout }
    }

    fn degrade(op: &'static str, key: &str, err: KvError) {
        tracing::warn!(op, key, error = %err, "Cache backend failed, falling through");
    }

    /// Cached value for `key`, or `None` on miss or backend failure
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match bounded(self.timeout, self.kv.get(key)).await {
            Ok(raw) => raw?,
            Err(e) => {
                Self::degrade("get", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Undecodable cache entry, treating as miss");
                None
            }
        }
    }

    /// Store a value; failures are logged and swallowed
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Value not cacheable");
                return;
            }
        };
        if let Err(e) = bounded(self.timeout, self.kv.set(key, raw, Some(ttl))).await {
            Self::degrade("set", key, e);
        }
    }

    /// Return the cached value or fetch it from the source of truth and populate
    ///
    /// Errors from `fetch` are the source's own and propagate unchanged.
    pub async fn get_or_set<T, E, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key).await {
            return Ok(hit);
        }
        tracing::debug!(key, "Cache miss");
        let value = fetch().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }

    pub async fn delete(&self, key: &str) -> bool {
        match bounded(self.timeout, self.kv.delete(key)).await {
            Ok(existed) => existed,
            Err(e) => {
                Self::degrade("delete", key, e);
                false
            }
        }
    }

    /// Delete every key matching `pattern`, returning the count (0 on failure)
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        match bounded(self.timeout, self.kv.delete_pattern(pattern)).await {
            Ok(count) => count,
            Err(e) => {
                Self::degrade("delete_pattern", pattern, e);
                0
            }
        }
    }

    /// Drop every cached view of a product: its detail keys and all list and search pages
    pub async fn invalidate_product(&self, product_id: &str) -> u64 {
        let mut removed = self.delete_pattern(&keys::product_pattern(product_id)).await;
        removed += self.delete_pattern(keys::PRODUCT_LIST_PATTERN).await;
        removed += self.delete_pattern(keys::SEARCH_PATTERN).await;
        tracing::debug!(product_id, removed, "Invalidated product cache");
        removed
    }
}
