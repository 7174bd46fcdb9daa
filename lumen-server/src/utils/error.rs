//! Unified service-layer error type
//!
//! `ServiceError` bridges catalog store errors (`StoreError`) and the API-layer
//! error (`AppError`), so services can use `?` on both without hand-written
//! `.map_err(|e| { tracing::error!(...); AppError::new(...) })` at every call.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::catalog::StoreError;
use crate::pricing::PricingError;

/// Service-layer error with two variants
///
/// - `Store`: catalog backend failures (logged, mapped to InternalError)
/// - `App`: business-rule errors (passed to the client as they are)
#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    App(AppError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Store(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<PricingError> for ServiceError {
    fn from(e: PricingError) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Store(store_err) => {
                tracing::error!(error = %store_err, "Catalog store error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
