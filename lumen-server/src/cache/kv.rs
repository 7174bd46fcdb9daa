//! Key-value store port
//!
//! The cache layer and the rate limiter share one KV backend. Both treat it
//! as optional infrastructure: every call is bounded by a short timeout and
//! any failure degrades instead of failing the request.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvError {
    #[error("kv backend unavailable: {0}")]
    Unavailable(String),

    #[error("kv call timed out after {0:?}")]
    Timeout(Duration),

    #[error("value at {0} is not an integer")]
    NotAnInteger(String),
}

/// Generic KV operations with TTL
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Store a value; `None` keeps it until deleted
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), KvError>;

    /// Returns whether the key existed
    async fn delete(&self, key: &str) -> Result<bool, KvError>;

    /// Delete every key matching a glob pattern (`*`, `?`), returning the count
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, KvError>;

    /// Atomically add `delta` to an integer value, creating it with `ttl` when absent
    async fn incr_by(&self, key: &str, delta: i64, ttl: Duration) -> Result<i64, KvError>;
}

/// Run a KV call under a deadline
pub async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, KvError>
where
    F: Future<Output = Result<T, KvError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(KvError::Timeout(timeout)),
    }
}

// ==================== Glob matching ====================

/// Match `key` against a glob with `*` (any run) and `?` (any one char)
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let k: Vec<char> = key.chars().collect();
    let (mut pi, mut ki) = (0, 0);
    // Position of the last `*` and the key index it was tried at
    let mut star: Option<(usize, usize)> = None;

    while ki < k.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == k[ki]) {
            pi += 1;
            ki += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ki));
            pi += 1;
        } else if let Some((sp, sk)) = star {
            pi = sp + 1;
            ki = sk + 1;
            star = Some((sp, sk + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

// ==================== In-memory backend ====================

#[derive(Debug, Clone)]
struct KvEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl KvEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Process-local KV backend
///
/// Expiry uses the tokio clock, so paused-time tests can step past TTLs.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: DashMap<String, KvEntry>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let now = Instant::now();
        let value = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if value.is_none() {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), KvError> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .insert(key.to_string(), KvEntry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired(now)))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, KvError> {
        let now = Instant::now();
        let mut removed = 0u64;
        self.entries.retain(|key, entry| {
            if glob_match(pattern, key) {
                if !entry.is_expired(now) {
                    removed += 1;
                }
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    async fn incr_by(&self, key: &str, delta: i64, ttl: Duration) -> Result<i64, KvError> {
        let now = Instant::now();
        let fresh = |value: i64| KvEntry {
            value: value.to_string(),
            expires_at: Some(now + ttl),
        };

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.is_expired(now) {
                    *entry = fresh(delta);
                    return Ok(delta);
                }
                let current: i64 = entry
                    .value
                    .parse()
                    .map_err(|_| KvError::NotAnInteger(key.to_string()))?;
                let next = current + delta;
                entry.value = next.to_string();
                Ok(next)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh(delta));
                Ok(delta)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("product:p1:*", "product:p1:en"));
        assert!(glob_match("product:p1:*", "product:p1:"));
        assert!(!glob_match("product:p1:*", "product:p10:en"));
        assert!(glob_match("products:list:*", "products:list:en:p1:n20:abcd"));
        assert!(!glob_match("product:*", "products:list:en"));
        assert!(glob_match("search:??:*", "search:en:abc:p1"));
        assert!(!glob_match("search:??:*", "search:eng:abc:p1"));
        assert!(glob_match("*", ""));
        assert!(glob_match("a*b*c", "a-xx-b-yy-c"));
        assert!(!glob_match("a*b*c", "a-xx-c-yy-b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let kv = MemoryKv::new();
        kv.set("k", "v".into(), Some(Duration::from_secs(10)))
            .await
            .unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(kv.get("k").await.unwrap(), None);
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn test_delete_pattern_counts_removed() {
        let kv = MemoryKv::new();
        for key in ["search:en:a:p1", "search:sv:b:p1", "product:p1:en"] {
            kv.set(key, "x".into(), None).await.unwrap();
        }
        assert_eq!(kv.delete_pattern("search:*").await.unwrap(), 2);
        assert_eq!(kv.len(), 1);
        assert!(kv.delete("product:p1:en").await.unwrap());
        assert!(!kv.delete("product:p1:en").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_incr_by_creates_and_resets_after_ttl() {
        let kv = MemoryKv::new();
        let ttl = Duration::from_secs(60);
        assert_eq!(kv.incr_by("c", 1, ttl).await.unwrap(), 1);
        assert_eq!(kv.incr_by("c", 1, ttl).await.unwrap(), 2);
        assert_eq!(kv.incr_by("c", -1, ttl).await.unwrap(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(kv.incr_by("c", 1, ttl).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_incr_by_rejects_non_integer() {
        let kv = MemoryKv::new();
        kv.set("c", "abc".into(), None).await.unwrap();
        assert_eq!(
            kv.incr_by("c", 1, Duration::from_secs(1)).await,
            Err(KvError::NotAnInteger("c".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let kv = MemoryKv::new();
        kv.set("short", "1".into(), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        kv.set("long", "1".into(), None).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(kv.purge_expired(), 1);
        assert_eq!(kv.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result: Result<(), KvError> = bounded(Duration::from_millis(150), async {
            std::future::pending::<()>().await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(KvError::Timeout(Duration::from_millis(150))));
    }
}
