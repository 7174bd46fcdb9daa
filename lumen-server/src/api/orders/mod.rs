//! Order API Module
//!
//! Creation has its own, tighter limiter class.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::core::ServerState;
use crate::rate_limit::{api_rate_limit, order_rate_limit};

pub fn router(state: &ServerState) -> Router<ServerState> {
    let create = Router::new()
        .route("/api/orders", post(handler::create))
        .route_layer(middleware::from_fn_with_state(state.clone(), order_rate_limit));

    let manage = Router::new()
        .route("/api/orders/{id}", get(handler::get_by_id))
        .route("/api/orders/{id}/status", post(handler::update_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_rate_limit));

    create.merge(manage)
}
