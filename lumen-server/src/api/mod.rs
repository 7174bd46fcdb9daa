//! HTTP API
//!
//! # Routes
//!
//! | Path | Method | Limiter | Auth |
//! |------|--------|---------|------|
//! | /health | GET | - | - |
//! | /api/auth/session | GET | auth | required |
//! | /api/products | GET | api | - |
//! | /api/products/{id} | GET | api | - |
//! | /api/configurations | POST | api | optional |
//! | /api/configurations/{id} | GET, POST | api | owner, when owned |
//! | /api/pricing/validate | POST | api | required |
//! | /api/orders | POST | order | required |
//! | /api/orders/{id} | GET | api | required |
//! | /api/orders/{id}/status | POST | api | required |

use axum::Router;
use http::{HeaderName, HeaderValue, StatusCode};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub mod auth;
pub mod configurations;
pub mod health;
pub mod orders;
pub mod pricing;
pub mod products;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upper bound on requests in flight across the whole router
const MAX_CONCURRENT_REQUESTS: usize = 512;

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no global middleware, no state)
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        // Public
        .merge(health::router())
        .merge(products::router(state))
        .merge(configurations::router(state))
        // Authentication required
        .merge(auth::router(state))
        .merge(pricing::router(state))
        .merge(orders::router(state))
}

/// Build the fully configured application
///
/// Used by the HTTP server and by in-process tests.
pub fn build_app(state: &ServerState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router(state)
        .with_state(state.clone())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout(),
        ))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(CorsLayer::permissive())
        // Trace - request spans at INFO
        .layer(TraceLayer::new_for_http())
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        // Request ID - outermost, so traces see it
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
}
