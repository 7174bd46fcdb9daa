//! Lumen Server - pricing consistency service for the lighting storefront
//!
//! Prices agreed on during product configuration are never trusted from the
//! client; they are re-derived from catalog data on every write.
//!
//! # Module structure
//!
//! ```text
//! lumen-server/src/
//! ├── pricing/         # pure price computation
//! ├── cache/           # KV port, key builders, fail-open cache layer
//! ├── catalog/         # catalog store port, in-memory store, cached reads
//! ├── configurations/  # configuration aggregate manager
//! ├── orders/          # order finalizer
//! ├── rate_limit/      # sliding-window limiter and middleware
//! ├── auth/            # identity provider token verification
//! ├── api/             # HTTP routes and handlers
//! ├── core/            # config, state, server
//! └── utils/           # logger, service errors, validation
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod configurations;
pub mod core;
pub mod orders;
pub mod pricing;
pub mod rate_limit;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

/// Security events go to their own log target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
