//! Rate limit middleware
//!
//! Runs before authentication and business logic. Every limited response
//! carries `X-RateLimit-*` headers; a rejection is a terminal 429 with
//! `Retry-After`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{HeaderMap, HeaderName, HeaderValue, header::RETRY_AFTER};
use shared::error::AppError;
use shared::util::now_millis;

use super::{LimiterClass, RateLimitDecision, request_identity};
use crate::core::ServerState;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

fn write_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset_at_secs()));
}

async fn enforce(
    state: &ServerState,
    class: LimiterClass,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let identity = request_identity(&request);
    let decision = state.rate_limiter().allow(&identity, class).await;

    if !decision.allowed {
        let retry_after = decision.retry_after_secs(now_millis());
        tracing::debug!(
            class = %class,
            retry_after,
            path = %request.uri().path(),
            "Request throttled"
        );
        let mut response = AppError::rate_limited(retry_after).into_response();
        write_headers(response.headers_mut(), &decision);
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(retry_after));
        return Err(response);
    }

    let mut response = next.run(request).await;
    write_headers(response.headers_mut(), &decision);
    Ok(response)
}

/// Order creation: 5 requests/minute per client by default
pub async fn order_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    enforce(&state, LimiterClass::OrderCreation, request, next).await
}

/// Generic API writes: 100 requests/minute per client by default
pub async fn api_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    enforce(&state, LimiterClass::GenericApi, request, next).await
}

/// Auth endpoints: 10 requests/minute per client by default
pub async fn auth_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    enforce(&state, LimiterClass::Auth, request, next).await
}
