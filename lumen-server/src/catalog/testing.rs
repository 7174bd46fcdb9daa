//! Catalog fixtures for unit tests

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    AttributeSelection, ColorTemperature, Configuration, ConfigurationUpdate, DiscountRate,
    FixtureShape, FixtureSpec, IpRating, LampType, Order, OrderStatus, PriceModifiers, Product,
    ShippingAddress,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::store::{CatalogStore, ProductPage, ProductQuery, StoreError};
use super::MemoryCatalog;
use crate::pricing;

pub fn modifiers() -> PriceModifiers {
    PriceModifiers {
        ip_rates: [
            (IpRating::Ip20, Decimal::ZERO),
            (IpRating::Ip44, Decimal::new(2, 2)),
            (IpRating::Ip54, Decimal::new(4, 2)),
            (IpRating::Ip65, Decimal::new(6, 2)),
            (IpRating::Ip68, Decimal::new(8, 2)),
        ]
        .into_iter()
        .collect(),
        lamp_rates: [
            (LampType::Lamp9w, Decimal::ZERO),
            (LampType::Lamp12w, Decimal::from(50)),
            (LampType::Lamp18w, Decimal::from(120)),
            (LampType::Lamp24w, Decimal::from(200)),
        ]
        .into_iter()
        .collect(),
    }
}

pub fn default_selection() -> AttributeSelection {
    AttributeSelection {
        ip_rating: IpRating::Ip20,
        lamp_type: LampType::Lamp9w,
        color_temperature: ColorTemperature::K3000,
    }
}

/// Active three-arm chandelier, 10% off, 69 shipping
pub fn product(id: &str, base_price: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Chandelier {}", id),
        base_price: Decimal::from(base_price),
        discount: DiscountRate::from_ratio(Decimal::new(1, 1)).unwrap(),
        price_modifiers: modifiers(),
        specification: FixtureSpec::new(FixtureShape::Chandelier { arm_count: 3 }),
        default_selection: default_selection(),
        shipping_price: Decimal::from(69),
        is_active: true,
        created_at: 0,
        updated_at: 0,
    }
}

/// Freshly priced configuration of `product` at its default selection
pub fn configuration(id: &str, product: &Product) -> Configuration {
    let b = pricing::calculate_for_product(product, product.default_selection, 1).unwrap();
    Configuration {
        id: id.to_string(),
        product_id: product.id.clone(),
        owner_id: None,
        selection: product.default_selection,
        quantity: b.quantity,
        price_increase: b.price_increase,
        lamp_price_increase: b.lamp_price_increase,
        unit_price: b.unit_price,
        subtotal: b.subtotal,
        discount: b.discount_rate,
        discount_amount: b.discount_amount,
        shipping_price: b.shipping_price,
        total_price: b.total_price,
        version: 0,
        created_at: 0,
        updated_at: 0,
    }
}

pub fn update_of(c: &Configuration) -> ConfigurationUpdate {
    ConfigurationUpdate {
        product_id: c.product_id.clone(),
        selection: c.selection,
        quantity: c.quantity,
        price_increase: c.price_increase,
        lamp_price_increase: c.lamp_price_increase,
        unit_price: c.unit_price,
        subtotal: c.subtotal,
        discount: c.discount,
        discount_amount: c.discount_amount,
        shipping_price: c.shipping_price,
        total_price: c.total_price,
    }
}

pub fn order(id: &str) -> Order {
    Order {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        product_id: "p1".to_string(),
        configuration_id: "cfg-1".to_string(),
        selection: default_selection(),
        quantity: 1,
        product_price: Decimal::from(1000),
        discount_rate: DiscountRate::ZERO,
        discounted_price: Decimal::from(1000),
        shipping_price: Decimal::from(69),
        total_price: Decimal::from(1069),
        shipping_address: ShippingAddress {
            user_id: "user-1".to_string(),
            recipient_name: "Ada Lovelace".to_string(),
            street: "Storgatan 1".to_string(),
            city: "Stockholm".to_string(),
            postal_code: "11122".to_string(),
            country: "SE".to_string(),
            phone: None,
            email: None,
            updated_at: 0,
        },
        status: OrderStatus::Pending,
        created_at: 0,
        updated_at: 0,
    }
}

/// In-memory store with injectable write failures
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryCatalog,
    version_losses: AtomicU32,
    reject_orders: AtomicBool,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n` configuration writes lose the version race
    pub fn lose_version_races(&self, n: u32) {
        self.version_losses.store(n, Ordering::SeqCst);
    }

    /// Every order insert fails with a backend error
    pub fn reject_orders(&self) {
        self.reject_orders.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogStore for FaultyStore {
    async fn find_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        self.inner.find_product(id).await
    }
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, StoreError> {
        self.inner.list_products(query).await
    }
    async fn save_product(&self, product: Product) -> Result<(), StoreError> {
        self.inner.save_product(product).await
    }
    async fn find_configuration(&self, id: &str) -> Result<Option<Configuration>, StoreError> {
        self.inner.find_configuration(id).await
    }
    async fn insert_configuration(&self, c: Configuration) -> Result<(), StoreError> {
        self.inner.insert_configuration(c).await
    }
    async fn update_configuration(
        &self,
        id: &str,
        expected_version: u64,
        update: ConfigurationUpdate,
        now: i64,
    ) -> Result<Configuration, StoreError> {
        if self
            .version_losses
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                actual: expected_version + 1,
            });
        }
        self.inner
            .update_configuration(id, expected_version, update, now)
            .await
    }
    async fn create_order(&self, order: Order) -> Result<(), StoreError> {
        if self.reject_orders.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("orders table unavailable".into()));
        }
        self.inner.create_order(order).await
    }
    async fn find_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        self.inner.find_order(id).await
    }
    async fn update_order_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        now: i64,
    ) -> Result<Order, StoreError> {
        self.inner.update_order_status(id, expected, next, now).await
    }
    async fn upsert_shipping_address(&self, a: ShippingAddress) -> Result<(), StoreError> {
        self.inner.upsert_shipping_address(a).await
    }
    async fn find_shipping_address(
        &self,
        user_id: &str,
    ) -> Result<Option<ShippingAddress>, StoreError> {
        self.inner.find_shipping_address(user_id).await
    }
}
