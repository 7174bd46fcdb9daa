//! Shipping Address Model
//!
//! One stored address per user, overwritten by every order.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stored shipping address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub user_id: String,
    pub recipient_name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2
    pub country: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub updated_at: i64,
}

/// Shipping address as submitted with an order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressInput {
    #[validate(length(min = 1, max = 200))]
    pub recipient_name: String,
    #[validate(length(min = 1, max = 500))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 2, max = 16))]
    pub postal_code: String,
    #[validate(length(equal = 2))]
    pub country: String,
    #[validate(length(min = 5, max = 32))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

impl ShippingAddressInput {
    /// Turn the submitted address into the stored row for `user_id`
    pub fn into_address(self, user_id: impl Into<String>, now: i64) -> ShippingAddress {
        ShippingAddress {
            user_id: user_id.into(),
            recipient_name: self.recipient_name.trim().to_string(),
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            country: self.country.trim().to_ascii_uppercase(),
            phone: self.phone.map(|p| p.trim().to_string()),
            email: self.email.map(|e| e.trim().to_lowercase()),
            updated_at: now,
        }
    }
}
