//! Pricing Engine Module
//!
//! Pure, I/O-free price computation for configured fixtures. Every write
//! path (configuration updates, pricing validation, order creation) runs
//! through here with catalog data only.

mod calculator;

pub use calculator::*;

use shared::error::{AppError, ErrorCode};
use shared::models::{AttributeKind, UnknownAttribute};
use thiserror::Error;

/// Pricing failures
///
/// All of them are client or catalog errors and surface as 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("unknown {kind} value: {value}")]
    UnknownAttributeValue { kind: AttributeKind, value: String },

    #[error("quantity must be between 1 and {max}, got {0}", max = MAX_QUANTITY)]
    InvalidQuantity(i64),

    #[error("invalid catalog data: {0}")]
    InvalidCatalogData(String),
}

impl PricingError {
    pub(crate) fn unknown(kind: AttributeKind, value: impl Into<String>) -> Self {
        Self::UnknownAttributeValue {
            kind,
            value: value.into(),
        }
    }
}

impl From<UnknownAttribute> for PricingError {
    fn from(e: UnknownAttribute) -> Self {
        Self::UnknownAttributeValue {
            kind: e.kind,
            value: e.value,
        }
    }
}

impl From<PricingError> for AppError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::UnknownAttributeValue { kind, value } => AppError::with_message(
                ErrorCode::UnknownAttributeValue,
                format!("Unknown {} value: {}", kind, value),
            )
            .with_detail("attribute", kind.as_str())
            .with_detail("value", value),
            PricingError::InvalidQuantity(q) => AppError::with_message(
                ErrorCode::InvalidQuantity,
                format!("Quantity must be between 1 and {}", MAX_QUANTITY),
            )
            .with_detail("quantity", q),
            PricingError::InvalidCatalogData(reason) => {
                tracing::error!(%reason, "Invalid catalog data reached the pricing engine");
                AppError::new(ErrorCode::InvalidCatalogData)
            }
        }
    }
}
