//! Rate limiting
//!
//! - [`RateLimiter`] - sliding-window counter over the shared KV store
//! - [`resolve_identity`] - client address resolution
//! - middleware per limiter class

mod identity;
mod limiter;
pub mod middleware;

pub use identity::{LOOPBACK_IDENTITY, request_identity, resolve_identity};
pub use limiter::{LimitPolicy, LimiterClass, RateLimitConfig, RateLimitDecision, RateLimiter};
pub use middleware::{api_rate_limit, auth_rate_limit, order_rate_limit};
