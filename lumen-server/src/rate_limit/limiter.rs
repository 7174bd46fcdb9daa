//! Sliding-window rate limiter
//!
//! Two-bucket weighted window over the shared KV store. For a request at
//! `elapsed` milliseconds into the current fixed window:
//!
//! ```text
//! estimate = previous_count x (1 - elapsed / window) + current_count
//! ```
//!
//! A request is allowed while the estimate (before counting it) is below the
//! limit. Rejected requests are un-counted so they never consume quota.
//! Backend failures and timeouts let the request through.

use shared::util::now_millis;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{KvError, KvStore, bounded};

/// Endpoint class, each with its own budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimiterClass {
    OrderCreation,
    GenericApi,
    Auth,
}

impl LimiterClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderCreation => "order",
            Self::GenericApi => "api",
            Self::Auth => "auth",
        }
    }
}

impl fmt::Display for LimiterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget of one class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl LimitPolicy {
    pub const fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

/// Budgets for every class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub order_creation: LimitPolicy,
    pub generic_api: LimitPolicy,
    pub auth: LimitPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            order_creation: LimitPolicy::per_minute(5),
            generic_api: LimitPolicy::per_minute(100),
            auth: LimitPolicy::per_minute(10),
        }
    }
}

impl RateLimitConfig {
    pub fn policy(&self, class: LimiterClass) -> LimitPolicy {
        match class {
            LimiterClass::OrderCreation => self.order_creation,
            LimiterClass::GenericApi => self.generic_api,
            LimiterClass::Auth => self.auth,
        }
    }
}

/// Outcome of one `allow` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Unix millis at which a request would next be allowed
    pub reset_at: i64,
}

impl RateLimitDecision {
    /// Whole seconds until `reset_at`, at least one
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let wait_ms = (self.reset_at - now_ms).max(0) as u64;
        wait_ms.div_ceil(1000).max(1)
    }

    /// `reset_at` as Unix seconds, rounded up
    pub fn reset_at_secs(&self) -> i64 {
        (self.reset_at + 999).div_euclid(1000)
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    kv: Arc<dyn KvStore>,
    config: RateLimitConfig,
    timeout: Duration,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn window_key(class: LimiterClass, identity: &str, window_start: i64) -> String {
    format!("ratelimit:{}:{}:{}", class, identity, window_start)
}

/// Earliest instant at which the estimate drops below `limit`
fn earliest_reset(previous: i64, current: i64, limit: u32, window_start: i64, window_ms: i64) -> i64 {
    let limit_f = f64::from(limit);
    let window_f = window_ms as f64;
    if limit == 0 {
        return window_start + window_ms;
    }
    if current >= i64::from(limit) {
        // Must wait for the current bucket to become the decaying one
        let decay = window_f * (1.0 - limit_f / current as f64);
        window_start + window_ms + decay.floor() as i64 + 1
    } else {
        let decay = window_f * (1.0 - (limit_f - current as f64) / previous.max(1) as f64);
        window_start + decay.max(0.0).floor() as i64 + 1
    }
}

impl RateLimiter {
    pub fn new(kv: Arc<dyn KvStore>, config: RateLimitConfig, timeout: Duration) -> Self {
        Self {
            kv,
            config,
            timeout,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and count one request for `identity` in `class`
    pub async fn allow(&self, identity: &str, class: LimiterClass) -> RateLimitDecision {
        self.allow_at(identity, class, now_millis()).await
    }

    /// Same as [`allow`](Self::allow) at an explicit wall-clock instant
    pub async fn allow_at(&self, identity: &str, class: LimiterClass, now_ms: i64) -> RateLimitDecision {
        let policy = self.config.policy(class);
        let window_ms = (policy.window.as_millis() as i64).max(1);
        let window_start = now_ms - now_ms.rem_euclid(window_ms);

        match self
            .evaluate(identity, class, policy, now_ms, window_start, window_ms)
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(
                    class = %class,
                    identity,
                    error = %e,
                    "Rate limiter backend failed, allowing request"
                );
                RateLimitDecision {
                    allowed: true,
                    limit: policy.max_requests,
                    remaining: policy.max_requests,
                    reset_at: window_start + window_ms,
                }
            }
        }
    }

    async fn evaluate(
        &self,
        identity: &str,
        class: LimiterClass,
        policy: LimitPolicy,
        now_ms: i64,
        window_start: i64,
        window_ms: i64,
    ) -> Result<RateLimitDecision, KvError> {
        let limit = policy.max_requests;
        let ttl = policy.window * 2;
        let current_key = window_key(class, identity, window_start);
        let previous_key = window_key(class, identity, window_start - window_ms);

        let previous = match bounded(self.timeout, self.kv.get(&previous_key)).await? {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| KvError::NotAnInteger(previous_key.clone()))?,
            None => 0,
        };
        let counted = bounded(self.timeout, self.kv.incr_by(&current_key, 1, ttl)).await?;

        let elapsed = (now_ms - window_start) as f64;
        let weight = 1.0 - elapsed / window_ms as f64;
        let estimate = previous as f64 * weight + (counted - 1) as f64;

        if estimate < f64::from(limit) {
            let remaining = (f64::from(limit) - estimate - 1.0).floor().max(0.0) as u32;
            return Ok(RateLimitDecision {
                allowed: true,
                limit,
                remaining,
                reset_at: window_start + window_ms,
            });
        }

        if let Err(e) = bounded(self.timeout, self.kv.incr_by(&current_key, -1, ttl)).await {
            tracing::warn!(key = %current_key, error = %e, "Failed to release rejected request");
        }

        let reset_at =
            earliest_reset(previous, counted - 1, limit, window_start, window_ms).max(now_ms + 1);
        tracing::info!(class = %class, identity, limit, reset_at, "Rate limit exceeded");

        Ok(RateLimitDecision {
            allowed: false,
            limit,
            remaining: 0,
            reset_at,
        })
    }
}
