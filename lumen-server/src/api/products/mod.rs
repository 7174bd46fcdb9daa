//! Product API Module
//!
//! Read-only catalog access, served through the cache.

mod handler;

use axum::{Router, middleware, routing::get};

use crate::core::ServerState;
use crate::rate_limit::api_rate_limit;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/products", get(handler::list))
        .route("/api/products/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_rate_limit))
}
