//! Configuration API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError};
use shared::models::{AttributeChange, AttributeKind, Configuration};

use crate::auth::OptionalUser;
use crate::configurations::{ConfigurationChanges, WriteGuard};
use crate::core::ServerState;
use crate::pricing::PricingError;
use crate::utils::{AppResult, JsonBody};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOrCreateRequest {
    pub product_id: String,
    /// Id the client remembered from an earlier visit
    pub configuration_id: Option<String>,
}

/// Attribute deltas and quantity; price-like fields are cross-checks only
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub product_id: Option<String>,
    pub ip_rating: Option<String>,
    pub lamp_type: Option<String>,
    pub color_temperature: Option<String>,
    pub quantity: Option<i64>,
    pub version: Option<u64>,
    pub expected_total: Option<Decimal>,
}

impl UpdateRequest {
    fn into_parts(self) -> Result<(ConfigurationChanges, WriteGuard), AppError> {
        let deltas = [
            (AttributeKind::IpRating, self.ip_rating),
            (AttributeKind::LampType, self.lamp_type),
            (AttributeKind::ColorTemperature, self.color_temperature),
        ];

        let mut attributes = Vec::new();
        for (kind, value) in deltas {
            if let Some(value) = value {
                let change = AttributeChange::parse(kind, value.trim()).map_err(PricingError::from)?;
                attributes.push(change);
            }
        }

        let changes = ConfigurationChanges {
            product_id: self.product_id,
            attributes,
            quantity: self.quantity,
        };
        let guard = WriteGuard {
            expected_version: self.version,
            expected_total: self.expected_total,
        };
        Ok((changes, guard))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub success: bool,
    pub config_id: String,
    pub data: Configuration,
}

/// Return the caller's configuration for a product, creating it when needed
pub async fn get_or_create(
    State(state): State<ServerState>,
    OptionalUser(user): OptionalUser,
    JsonBody(payload): JsonBody<GetOrCreateRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Configuration>>)> {
    if payload.product_id.trim().is_empty() {
        return Err(AppError::validation("productId must not be empty").with_detail("productId", "required"));
    }

    let (configuration, created) = state
        .configurations()
        .get_or_create(
            &payload.product_id,
            payload.configuration_id.as_deref(),
            user.as_ref().map(|u| u.id.as_str()),
        )
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::success(configuration))))
}

/// Get configuration by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Configuration>>> {
    let caller = user.as_ref().map(|u| u.id.as_str());
    let configuration = state.configurations().get_as(caller, &id).await?;
    Ok(Json(ApiResponse::success(configuration)))
}

/// Apply attribute deltas and/or a quantity change
pub async fn update(
    State(state): State<ServerState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateRequest>,
) -> AppResult<Json<UpdateResponse>> {
    let (changes, guard) = payload.into_parts()?;
    let caller = user.as_ref().map(|u| u.id.as_str());
    let configuration = state
        .configurations()
        .update_as(caller, &id, &changes, guard)
        .await?;

    Ok(Json(UpdateResponse {
        success: true,
        config_id: configuration.id.clone(),
        data: configuration,
    }))
}
