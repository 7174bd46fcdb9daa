//! Pricing API Module

use axum::{Json, Router, extract::State, middleware, routing::post};
use shared::error::ApiResponse;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::{PricingCheck, PricingValidation};
use crate::rate_limit::api_rate_limit;
use crate::utils::{AppResult, JsonBody};

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/pricing/validate", post(validate))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_rate_limit))
}

/// Re-price a configuration the caller owns, without writing it
async fn validate(
    State(state): State<ServerState>,
    user: CurrentUser,
    JsonBody(check): JsonBody<PricingCheck>,
) -> AppResult<Json<ApiResponse<PricingValidation>>> {
    let result = state.orders().validate_pricing(&user, &check).await?;
    Ok(Json(ApiResponse::success(result)))
}
