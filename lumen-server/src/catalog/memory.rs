//! In-memory catalog store

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shared::models::{
    Configuration, ConfigurationUpdate, Order, OrderStatus, Product, ProductSummary,
    ShippingAddress,
};

use super::store::{CatalogStore, ProductPage, ProductQuery, StoreError};

/// Process-local catalog
///
/// Each row lives in its own map entry, so a compare-and-set holds only that
/// entry's shard lock.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: DashMap<String, Product>,
    configurations: DashMap<String, Configuration>,
    orders: DashMap<String, Order>,
    addresses: DashMap<String, ShippingAddress>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

fn matches_search(product: &Product, search: Option<&str>) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => product
            .name
            .to_lowercase()
            .contains(&term.to_lowercase()),
        None => true,
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn find_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get(id).map(|p| p.clone()))
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, StoreError> {
        let mut matching: Vec<ProductSummary> = self
            .products
            .iter()
            .filter(|p| !query.active_only || p.is_active)
            .filter(|p| matches_search(p.value(), query.search.as_deref()))
            .map(|p| ProductSummary::from(p.value()))
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let per_page = query.per_page.max(1);
        let page = query.page.max(1);
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(((page - 1) as usize).saturating_mul(per_page as usize))
            .take(per_page as usize)
            .collect();

        Ok(ProductPage {
            items,
            total,
            page,
            per_page,
        })
    }

    async fn save_product(&self, product: Product) -> Result<(), StoreError> {
        self.products.insert(product.id.clone(), product);
        Ok(())
    }

    async fn find_configuration(&self, id: &str) -> Result<Option<Configuration>, StoreError> {
        Ok(self.configurations.get(id).map(|c| c.clone()))
    }

    async fn insert_configuration(&self, configuration: Configuration) -> Result<(), StoreError> {
        match self.configurations.entry(configuration.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                entity: "configuration",
                id: configuration.id,
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(configuration);
                Ok(())
            }
        }
    }

    async fn update_configuration(
        &self,
        id: &str,
        expected_version: u64,
        update: ConfigurationUpdate,
        now: i64,
    ) -> Result<Configuration, StoreError> {
        let mut row = self
            .configurations
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "configuration",
                id: id.to_string(),
            })?;

        if row.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                actual: row.version,
            });
        }

        row.apply(update, now);
        Ok(row.clone())
    }

    async fn create_order(&self, order: Order) -> Result<(), StoreError> {
        match self.orders.entry(order.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                entity: "order",
                id: order.id,
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(order);
                Ok(())
            }
        }
    }

    async fn find_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(id).map(|o| o.clone()))
    }

    async fn update_order_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        now: i64,
    ) -> Result<Order, StoreError> {
        let mut row = self.orders.get_mut(id).ok_or_else(|| StoreError::NotFound {
            entity: "order",
            id: id.to_string(),
        })?;

        if row.status != expected {
            return Err(StoreError::StatusConflict {
                id: id.to_string(),
                expected,
                actual: row.status,
            });
        }

        row.status = next;
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn upsert_shipping_address(&self, address: ShippingAddress) -> Result<(), StoreError> {
        self.addresses.insert(address.user_id.clone(), address);
        Ok(())
    }

    async fn find_shipping_address(
        &self,
        user_id: &str,
    ) -> Result<Option<ShippingAddress>, StoreError> {
        Ok(self.addresses.get(user_id).map(|a| a.clone()))
    }
}
