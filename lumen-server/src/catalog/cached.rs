//! Cached catalog reader
//!
//! Product reads go through the cache layer; configurations and orders never
//! do, since they carry price truth.

use shared::models::Product;
use std::sync::Arc;

use super::store::{CatalogStore, ProductPage, ProductQuery, StoreError};
use crate::cache::{CacheLayer, CacheTier, keys};

#[derive(Clone)]
pub struct CachedCatalog {
    store: Arc<dyn CatalogStore>,
    cache: CacheLayer,
}

impl CachedCatalog {
    pub fn new(store: Arc<dyn CatalogStore>, cache: CacheLayer) -> Self {
        Self { store, cache }
    }

    /// Underlying store, for reads that must bypass the cache
    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    pub fn cache(&self) -> &CacheLayer {
        &self.cache
    }

    /// Product detail, cached per locale
    ///
    /// Missing products are not cached.
    pub async fn product(&self, id: &str, locale: &str) -> Result<Option<Product>, StoreError> {
        let key = keys::product(id, locale);
        if let Some(hit) = self.cache.get::<Product>(&key).await {
            return Ok(Some(hit));
        }

        let product = self.store.find_product(id).await?;
        if let Some(p) = &product {
            self.cache.set(&key, p, CacheTier::Detail.ttl()).await;
        }
        Ok(product)
    }

    /// Product straight from the store
    pub async fn product_fresh(&self, id: &str) -> Result<Option<Product>, StoreError> {
        self.store.find_product(id).await
    }

    /// One page of products; free-text queries use the search tier
    pub async fn list_products(
        &self,
        locale: &str,
        query: &ProductQuery,
    ) -> Result<ProductPage, StoreError> {
        let (key, tier) = match query.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let shape = format!("{}|{}|n{}", term, query.filter_fingerprint(), query.per_page);
                (keys::search(locale, &shape, query.page), CacheTier::Search)
            }
            _ => (
                keys::product_list(locale, query.page, query.per_page, &query.filter_fingerprint()),
                CacheTier::List,
            ),
        };

        self.cache
            .get_or_set(&key, tier.ttl(), || self.store.list_products(query))
            .await
    }

    /// Write a product and drop every cached view of it
    pub async fn save_product(&self, product: Product) -> Result<(), StoreError> {
        let id = product.id.clone();
        self.store.save_product(product).await?;
        self.cache.invalidate_product(&id).await;
        tracing::info!(product_id = %id, "Product saved");
        Ok(())
    }
}
