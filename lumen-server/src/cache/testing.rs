//! KV doubles for fail-open tests

use async_trait::async_trait;
use std::time::Duration;

use super::kv::{KvError, KvStore};

/// Backend that rejects every call
pub struct FailingKv;

#[async_trait]
impl KvStore for FailingKv {
    async fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
        Err(KvError::Unavailable("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Option<Duration>) -> Result<(), KvError> {
        Err(KvError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<bool, KvError> {
        Err(KvError::Unavailable("connection refused".into()))
    }

    async fn delete_pattern(&self, _pattern: &str) -> Result<u64, KvError> {
        Err(KvError::Unavailable("connection refused".into()))
    }

    async fn incr_by(&self, _key: &str, _delta: i64, _ttl: Duration) -> Result<i64, KvError> {
        Err(KvError::Unavailable("connection refused".into()))
    }
}

/// Backend that never answers
pub struct StallingKv;

#[async_trait]
impl KvStore for StallingKv {
    async fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Option<Duration>) -> Result<(), KvError> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> Result<bool, KvError> {
        std::future::pending().await
    }

    async fn delete_pattern(&self, _pattern: &str) -> Result<u64, KvError> {
        std::future::pending().await
    }

    async fn incr_by(&self, _key: &str, _delta: i64, _ttl: Duration) -> Result<i64, KvError> {
        std::future::pending().await
    }
}
