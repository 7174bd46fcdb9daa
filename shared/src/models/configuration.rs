//! Configuration Model
//!
//! A customer's in-progress customization of one product together with the
//! price breakdown last computed for it. Every price field here is written
//! by the server from catalog data; clients never supply them.

use super::attribute::AttributeSelection;
use super::discount::DiscountRate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub id: String,
    pub product_id: String,
    /// User that created the configuration (None for anonymous sessions)
    pub owner_id: Option<String>,
    #[serde(flatten)]
    pub selection: AttributeSelection,
    pub quantity: u32,
    pub price_increase: Decimal,
    pub lamp_price_increase: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    /// Discount snapshot taken from the product at the last recompute
    pub discount: DiscountRate,
    pub discount_amount: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    /// Bumped on every persisted write
    pub version: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields rewritten on every recompute
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationUpdate {
    pub product_id: String,
    pub selection: AttributeSelection,
    pub quantity: u32,
    pub price_increase: Decimal,
    pub lamp_price_increase: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub discount: DiscountRate,
    pub discount_amount: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
}

impl Configuration {
    /// Apply a recomputed row, bumping the version
    pub fn apply(&mut self, update: ConfigurationUpdate, now: i64) {
        self.product_id = update.product_id;
        self.selection = update.selection;
        self.quantity = update.quantity;
        self.price_increase = update.price_increase;
        self.lamp_price_increase = update.lamp_price_increase;
        self.unit_price = update.unit_price;
        self.subtotal = update.subtotal;
        self.discount = update.discount;
        self.discount_amount = update.discount_amount;
        self.shipping_price = update.shipping_price;
        self.total_price = update.total_price;
        self.version += 1;
        self.updated_at = now;
    }
}
