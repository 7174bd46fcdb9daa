//! Configuration API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::core::ServerState;
use crate::rate_limit::api_rate_limit;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        // getOrCreate
        .route("/api/configurations", post(handler::get_or_create))
        .route(
            "/api/configurations/{id}",
            get(handler::get_by_id).post(handler::update),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), api_rate_limit))
}
