//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::ApiResponse;
use shared::models::{Order, OrderStatus};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::CreateOrderCommand;
use crate::utils::{AppResult, JsonBody};

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// Create an order from a configuration
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    JsonBody(cmd): JsonBody<CreateOrderCommand>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let order = state.orders().create_order(&user, cmd).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders().get_order(&user, &id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Move an order to another status
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<StatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .orders()
        .transition_status(&user, &id, payload.status)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
