//! Session API
//!
//! Sign-in itself happens at the identity provider; this only reports what
//! the presented token resolves to.

use axum::{Json, Router, middleware, routing::get};
use shared::error::ApiResponse;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::rate_limit::auth_rate_limit;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/auth/session", get(session))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_rate_limit))
}

/// Current session
async fn session(user: CurrentUser) -> Json<ApiResponse<CurrentUser>> {
    Json(ApiResponse::success(user))
}
