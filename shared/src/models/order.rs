//! Order Model

use super::attribute::AttributeSelection;
use super::discount::DiscountRate;
use super::shipping_address::ShippingAddress;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status
///
/// ```text
/// pending -> confirmed -> processing -> shipped -> delivered
///    |           |
///    +-----------+--> cancelled
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order entity
///
/// Price fields are frozen when the order is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub configuration_id: String,
    /// Attribute selection at order time
    pub selection: AttributeSelection,
    pub quantity: u32,
    /// Undiscounted subtotal (unit price x quantity)
    pub product_price: Decimal,
    pub discount_rate: DiscountRate,
    pub discounted_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}
