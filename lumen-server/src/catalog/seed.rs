//! Catalog seeding
//!
//! Turns `ProductCreate` payloads into validated products. This is where a
//! source's discount representation is normalized to a ratio.

use anyhow::Context;
use rust_decimal::Decimal;
use shared::models::{DiscountRate, Product, ProductCreate};
use shared::util::{new_id, now_millis};
use std::path::Path;

use super::CachedCatalog;

/// Build a product from a create payload, rejecting inconsistent catalog data
pub fn build_product(payload: ProductCreate, now: i64) -> anyhow::Result<Product> {
    let name = payload.name.trim().to_string();
    anyhow::ensure!(!name.is_empty(), "product name must not be empty");
    anyhow::ensure!(
        payload.base_price > Decimal::ZERO,
        "product {} has non-positive base price {}",
        name,
        payload.base_price
    );

    let discount = match payload.discount {
        Some(input) => DiscountRate::try_from(input)
            .with_context(|| format!("product {} has an invalid discount", name))?,
        None => DiscountRate::ZERO,
    };

    let shipping_price = payload.shipping_price.unwrap_or(Decimal::ZERO);
    anyhow::ensure!(
        shipping_price >= Decimal::ZERO,
        "product {} has negative shipping price",
        name
    );

    payload
        .price_modifiers
        .validate()
        .with_context(|| format!("product {} has invalid price modifiers", name))?;

    let selection = payload.default_selection;
    anyhow::ensure!(
        payload.price_modifiers.ip_rate(selection.ip_rating).is_some()
            && payload.price_modifiers.lamp_rate(selection.lamp_type).is_some(),
        "product {} default selection is not priced by its modifier tables",
        name
    );

    Ok(Product {
        id: payload.id.unwrap_or_else(new_id),
        name,
        base_price: payload.base_price,
        discount,
        price_modifiers: payload.price_modifiers,
        specification: payload.specification,
        default_selection: selection,
        shipping_price,
        is_active: payload.is_active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    })
}

/// Parse a JSON array of create payloads
pub fn parse_seed(json: &str) -> anyhow::Result<Vec<Product>> {
    let payloads: Vec<ProductCreate> =
        serde_json::from_str(json).context("catalog seed is not a valid product list")?;
    let now = now_millis();
    payloads
        .into_iter()
        .map(|p| build_product(p, now))
        .collect()
}

/// Load a seed file into the catalog, returning the number of products
pub async fn load_seed_file(catalog: &CachedCatalog, path: &Path) -> anyhow::Result<usize> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read catalog seed {}", path.display()))?;
    let products = parse_seed(&json)?;
    let count = products.len();
    for product in products {
        catalog
            .save_product(product)
            .await
            .context("failed to store seeded product")?;
    }
    tracing::info!(count, path = %path.display(), "Catalog seeded");
    Ok(count)
}
