use std::time::Duration;

use super::ServerError;
use crate::rate_limit::{LimitPolicy, RateLimitConfig};

const DEFAULT_ENVIRONMENT: &str = "development";

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 8080 | listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | IDP_JWT_SECRET | dev placeholder | HS256 secret shared with the identity provider (required outside development) |
/// | IDP_ISSUER | unset | expected `iss` claim |
/// | KV_TIMEOUT_MS | 150 | bound on every cache / limiter backend call |
/// | RATE_LIMIT_ORDER_MAX / RATE_LIMIT_ORDER_WINDOW_SECS | 5 / 60 | order creation |
/// | RATE_LIMIT_API_MAX / RATE_LIMIT_API_WINDOW_SECS | 100 / 60 | generic API |
/// | RATE_LIMIT_AUTH_MAX / RATE_LIMIT_AUTH_WINDOW_SECS | 10 / 60 | auth endpoints |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | CATALOG_SEED_PATH | unset | JSON product file loaded at startup |
/// | LOG_LEVEL | info | log level when `RUST_LOG` is unset |
/// | LOG_DIR | unset | directory for rolling log files |
///
/// # Example
///
/// ```ignore
/// HTTP_PORT=9000 IDP_JWT_SECRET=... cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub idp_jwt_secret: String,
    pub idp_issuer: Option<String>,
    pub kv_timeout_ms: u64,
    pub rate_limits: RateLimitConfig,
    pub request_timeout_ms: u64,
    pub catalog_seed_path: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    lookup(name).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn policy(
    lookup: &impl Fn(&str) -> Option<String>,
    prefix: &str,
    default: LimitPolicy,
) -> LimitPolicy {
    let max_requests = parse_or(lookup, &format!("{prefix}_MAX"), default.max_requests);
    let window_secs = parse_or(
        lookup,
        &format!("{prefix}_WINDOW_SECS"),
        default.window.as_secs(),
    );
    LimitPolicy {
        max_requests,
        window: Duration::from_secs(window_secs.max(1)),
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let environment =
            non_empty(&lookup, "ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.into());
        let defaults = RateLimitConfig::default();

        Ok(Self {
            http_port: parse_or(&lookup, "HTTP_PORT", 8080),
            idp_jwt_secret: Self::require_secret(&lookup, "IDP_JWT_SECRET", &environment)?,
            idp_issuer: non_empty(&lookup, "IDP_ISSUER"),
            kv_timeout_ms: parse_or(&lookup, "KV_TIMEOUT_MS", 150),
            rate_limits: RateLimitConfig {
                order_creation: policy(&lookup, "RATE_LIMIT_ORDER", defaults.order_creation),
                generic_api: policy(&lookup, "RATE_LIMIT_API", defaults.generic_api),
                auth: policy(&lookup, "RATE_LIMIT_AUTH", defaults.auth),
            },
            request_timeout_ms: parse_or(&lookup, "REQUEST_TIMEOUT_MS", 30_000),
            catalog_seed_path: non_empty(&lookup, "CATALOG_SEED_PATH"),
            log_level: non_empty(&lookup, "LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: non_empty(&lookup, "LOG_DIR"),
            environment,
        })
    }

    /// Secrets must be set and non-empty outside development
    fn require_secret(
        lookup: &impl Fn(&str) -> Option<String>,
        name: &str,
        environment: &str,
    ) -> Result<String, ServerError> {
        match non_empty(lookup, name) {
            Some(v) => Ok(v),
            None if environment == DEFAULT_ENVIRONMENT => Ok(format!("dev-{name}-not-for-production")),
            None => Err(ServerError::Config(format!(
                "{name} must be set in {environment} environment"
            ))),
        }
    }

    pub fn kv_timeout(&self) -> Duration {
        Duration::from_millis(self.kv_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEFAULT_ENVIRONMENT
    }
}
