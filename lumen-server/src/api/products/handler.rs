//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::Product;

use crate::catalog::{DEFAULT_LOCALE, ProductPage, ProductQuery};
use crate::core::ServerState;
use crate::utils::{AppResult, QueryParams, ServiceError};

const MAX_PER_PAGE: u32 = 100;
const MAX_LOCALE_LEN: usize = 16;

#[derive(Debug, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

/// Query params for listing products
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub locale: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Free-text search over product names
    pub q: Option<String>,
    pub active_only: Option<bool>,
}

/// Locales become part of cache keys, so only tag-like values pass
pub(crate) fn normalize_locale(locale: Option<&str>) -> Result<String, AppError> {
    let Some(raw) = locale.map(str::trim).filter(|l| !l.is_empty()) else {
        return Ok(DEFAULT_LOCALE.to_string());
    };
    let valid = raw.len() <= MAX_LOCALE_LEN
        && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::validation(format!("Invalid locale: {}", raw)).with_detail("locale", raw));
    }
    Ok(raw.to_ascii_lowercase())
}

/// List products (paginated, optionally filtered)
pub async fn list(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> AppResult<Json<ApiResponse<ProductPage>>> {
    let locale = normalize_locale(query.locale.as_deref())?;
    let defaults = ProductQuery::default();
    let product_query = ProductQuery {
        page: query.page.unwrap_or(defaults.page).max(1),
        per_page: query.per_page.unwrap_or(defaults.per_page).clamp(1, MAX_PER_PAGE),
        active_only: query.active_only.unwrap_or(defaults.active_only),
        search: query.q.filter(|q| !q.trim().is_empty()),
    };

    let page = state
        .catalog()
        .list_products(&locale, &product_query)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(ApiResponse::success(page)))
}

/// Get product by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<LocaleQuery>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let locale = normalize_locale(query.locale.as_deref())?;
    let product = state
        .catalog()
        .product(&id, &locale)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", id))
                .with_detail("productId", id.as_str())
        })?;
    Ok(Json(ApiResponse::success(product)))
}
