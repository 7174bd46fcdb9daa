//! Catalog store port
//!
//! Persistent products, configurations, orders and shipping addresses.
//! Configuration and order writes are compare-and-set on a single row; no
//! caller takes a lock around them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{
    Configuration, ConfigurationUpdate, Order, OrderStatus, Product, ProductSummary,
    ShippingAddress,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("configuration {id} is at version {actual}, expected {expected}")]
    VersionConflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("order {id} is {actual}, expected {expected}")]
    StatusConflict {
        id: String,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: String },

    #[error("catalog backend error: {0}")]
    Backend(String),
}

/// Product listing query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub page: u32,
    pub per_page: u32,
    pub active_only: bool,
    pub search: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            active_only: true,
            search: None,
        }
    }
}

impl ProductQuery {
    /// Canonical text of the filter part, used for cache key hashing
    pub fn filter_fingerprint(&self) -> String {
        format!("active={}", self.active_only)
    }
}

/// One page of products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<ProductSummary>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    // ========== Products ==========

    async fn find_product(&self, id: &str) -> Result<Option<Product>, StoreError>;

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, StoreError>;

    /// Insert or replace a product
    async fn save_product(&self, product: Product) -> Result<(), StoreError>;

    // ========== Configurations ==========

    async fn find_configuration(&self, id: &str) -> Result<Option<Configuration>, StoreError>;

    async fn insert_configuration(&self, configuration: Configuration) -> Result<(), StoreError>;

    /// Apply `update` only if the stored row is still at `expected_version`
    ///
    /// Returns the row as written, with its version bumped.
    async fn update_configuration(
        &self,
        id: &str,
        expected_version: u64,
        update: ConfigurationUpdate,
        now: i64,
    ) -> Result<Configuration, StoreError>;

    // ========== Orders ==========

    async fn create_order(&self, order: Order) -> Result<(), StoreError>;

    async fn find_order(&self, id: &str) -> Result<Option<Order>, StoreError>;

    /// Move an order from `expected` to `next`; price fields are never touched
    async fn update_order_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        now: i64,
    ) -> Result<Order, StoreError>;

    // ========== Shipping addresses ==========

    /// One address per user; the latest write wins
    async fn upsert_shipping_address(&self, address: ShippingAddress) -> Result<(), StoreError>;

    async fn find_shipping_address(
        &self,
        user_id: &str,
    ) -> Result<Option<ShippingAddress>, StoreError>;
}
