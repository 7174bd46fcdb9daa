//! Catalog Module
//!
//! - [`store`] - catalog store port and query types
//! - [`memory`] - in-memory store
//! - [`cached`] - product reads through the cache layer
//! - [`seed`] - building and loading products

mod cached;
mod memory;
pub mod seed;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use cached::CachedCatalog;
pub use memory::MemoryCatalog;
pub use store::{CatalogStore, ProductPage, ProductQuery, StoreError};

/// Locale used for product reads that are not tied to a client locale
pub const DEFAULT_LOCALE: &str = "en";
