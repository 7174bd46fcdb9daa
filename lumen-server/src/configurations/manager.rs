use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{AttributeChange, AttributeSelection, Configuration, ConfigurationUpdate, Product};
use shared::util::{new_id, now_millis};

use crate::catalog::{CachedCatalog, DEFAULT_LOCALE, StoreError};
use crate::pricing::{self, PriceBreakdown};
use crate::security_log;
use crate::utils::{ServiceError, ServiceResult};

/// Read-recompute-write cycles attempted before giving up on a contended row
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Client-side expectations checked before a write
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WriteGuard {
    /// Version the client last saw; a mismatch is a conflict, never retried
    pub expected_version: Option<u64>,
    /// Total the client displayed; checked against the recomputed total
    pub expected_total: Option<Decimal>,
}

/// A batch of edits applied in one write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationChanges {
    /// Must name the configuration's current product when present
    pub product_id: Option<String>,
    pub attributes: Vec<AttributeChange>,
    pub quantity: Option<i64>,
}

impl ConfigurationChanges {
    fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.quantity.is_none()
    }
}

fn update_from(product_id: &str, selection: AttributeSelection, b: &PriceBreakdown) -> ConfigurationUpdate {
    ConfigurationUpdate {
        product_id: product_id.to_string(),
        selection,
        quantity: b.quantity,
        price_increase: b.price_increase,
        lamp_price_increase: b.lamp_price_increase,
        unit_price: b.unit_price,
        subtotal: b.subtotal,
        discount: b.discount_rate,
        discount_amount: b.discount_amount,
        shipping_price: b.shipping_price,
        total_price: b.total_price,
    }
}

fn product_unavailable(product_id: &str) -> AppError {
    AppError::with_message(
        ErrorCode::ProductUnavailable,
        format!("Product {} is not available", product_id),
    )
    .with_detail("productId", product_id)
}

fn configuration_not_found(id: &str) -> AppError {
    AppError::with_message(
        ErrorCode::ConfigurationNotFound,
        format!("Configuration {} not found", id),
    )
    .with_detail("configurationId", id)
}

fn version_conflict(id: &str, expected: u64, actual: u64) -> AppError {
    AppError::with_message(
        ErrorCode::ConfigurationVersionConflict,
        format!("Configuration {} has changed since version {}", id, expected),
    )
    .with_detail("configurationId", id)
    .with_detail("expectedVersion", expected)
    .with_detail("currentVersion", actual)
}

/// Whether `caller` may read or edit `configuration`
///
/// Owned configurations belong to their owner only; anonymous ones are open
/// to whoever holds the id.
pub(crate) fn ensure_access(
    configuration: &Configuration,
    caller: Option<&str>,
) -> Result<(), AppError> {
    match configuration.owner_id.as_deref() {
        Some(owner) if Some(owner) != caller => {
            security_log!(
                "WARN",
                "configuration_foreign_access",
                user_id = caller.unwrap_or("anonymous"),
                config_id = configuration.id.as_str()
            );
            Err(AppError::forbidden("Configuration belongs to another user")
                .with_detail("configurationId", configuration.id.as_str()))
        }
        _ => Ok(()),
    }
}

/// Reject a submitted total that disagrees with the server's
pub(crate) fn check_expected(
    field: &str,
    server: Decimal,
    submitted: Option<Decimal>,
) -> Result<(), AppError> {
    match submitted {
        Some(submitted) if !pricing::amounts_match(server, submitted) => {
            tracing::warn!(
                field,
                expected = %pricing::round_money(server),
                submitted = %submitted,
                "Price mismatch rejected"
            );
            Err(AppError::price_mismatch(field, pricing::round_money(server), submitted))
        }
        _ => Ok(()),
    }
}

/// Configuration aggregate manager
#[derive(Clone)]
pub struct ConfigurationManager {
    catalog: CachedCatalog,
}

impl ConfigurationManager {
    pub fn new(catalog: CachedCatalog) -> Self {
        Self { catalog }
    }

    /// Current product through the cache; missing or inactive is unavailable
    async fn active_product(&self, product_id: &str) -> ServiceResult<Product> {
        match self.catalog.product(product_id, DEFAULT_LOCALE).await? {
            Some(p) if p.is_active => Ok(p),
            _ => Err(product_unavailable(product_id).into()),
        }
    }

    /// Configuration straight from the store
    pub async fn get(&self, id: &str) -> ServiceResult<Configuration> {
        self.catalog
            .store()
            .find_configuration(id)
            .await?
            .ok_or_else(|| configuration_not_found(id).into())
    }

    /// Configuration the caller may see
    pub async fn get_as(&self, caller: Option<&str>, id: &str) -> ServiceResult<Configuration> {
        let configuration = self.get(id).await?;
        ensure_access(&configuration, caller)?;
        Ok(configuration)
    }

    /// Return the caller's configuration for `product_id`, creating one if needed
    ///
    /// A known `configuration_id` for the same product is returned as stored.
    /// An unknown id, one bound to another product, or one owned by someone
    /// else yields a fresh configuration at the product's default selection.
    /// The flag is `true` when a configuration was created.
    pub async fn get_or_create(
        &self,
        product_id: &str,
        configuration_id: Option<&str>,
        owner_id: Option<&str>,
    ) -> ServiceResult<(Configuration, bool)> {
        if let Some(id) = configuration_id
            && let Some(existing) = self.catalog.store().find_configuration(id).await?
        {
            if ensure_access(&existing, owner_id).is_err() {
                tracing::debug!(config_id = %id, "Configuration owned by someone else, creating a new one");
            } else if existing.product_id == product_id {
                return Ok((existing, false));
            } else {
                tracing::debug!(
                    config_id = %id,
                    product_id,
                    bound_to = %existing.product_id,
                    "Configuration belongs to another product, creating a new one"
                );
            }
        }

        let product = self.active_product(product_id).await?;
        let selection = product.default_selection;
        let breakdown = pricing::calculate_for_product(&product, selection, 1)?;

        let now = now_millis();
        let configuration = Configuration {
            id: new_id(),
            product_id: product.id.clone(),
            owner_id: owner_id.map(str::to_string),
            selection,
            quantity: breakdown.quantity,
            price_increase: breakdown.price_increase,
            lamp_price_increase: breakdown.lamp_price_increase,
            unit_price: breakdown.unit_price,
            subtotal: breakdown.subtotal,
            discount: breakdown.discount_rate,
            discount_amount: breakdown.discount_amount,
            shipping_price: breakdown.shipping_price,
            total_price: breakdown.total_price,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        self.catalog
            .store()
            .insert_configuration(configuration.clone())
            .await?;
        tracing::info!(
            config_id = %configuration.id,
            product_id = %configuration.product_id,
            total = %configuration.total_price,
            "Configuration created"
        );
        Ok((configuration, true))
    }

    /// Change one attribute and re-price
    pub async fn apply_attribute_change(
        &self,
        id: &str,
        change: AttributeChange,
        guard: WriteGuard,
    ) -> ServiceResult<Configuration> {
        let changes = ConfigurationChanges {
            attributes: vec![change],
            ..ConfigurationChanges::default()
        };
        self.update(id, &changes, guard).await
    }

    /// Change the quantity and re-price
    pub async fn set_quantity(
        &self,
        id: &str,
        quantity: i64,
        guard: WriteGuard,
    ) -> ServiceResult<Configuration> {
        let changes = ConfigurationChanges {
            quantity: Some(quantity),
            ..ConfigurationChanges::default()
        };
        self.update(id, &changes, guard).await
    }

    /// [`update`](Self::update) on behalf of `caller`, who must be allowed to
    /// edit the configuration
    pub async fn update_as(
        &self,
        caller: Option<&str>,
        id: &str,
        changes: &ConfigurationChanges,
        guard: WriteGuard,
    ) -> ServiceResult<Configuration> {
        // Ownership never changes after creation, one check covers the retries
        self.get_as(caller, id).await?;
        self.update(id, changes, guard).await
    }

    /// Apply a batch of edits in one write
    ///
    /// The stored row is re-read on every attempt and re-priced from the
    /// current product, so only catalog data feeds the persisted prices. An
    /// empty batch still re-prices the row.
    pub async fn update(
        &self,
        id: &str,
        changes: &ConfigurationChanges,
        guard: WriteGuard,
    ) -> ServiceResult<Configuration> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let current = self.get(id).await?;

            if let Some(expected) = guard.expected_version
                && expected != current.version
            {
                return Err(version_conflict(id, expected, current.version).into());
            }

            if let Some(product_id) = &changes.product_id
                && *product_id != current.product_id
            {
                return Err(AppError::with_message(
                    ErrorCode::ConfigurationProductMismatch,
                    format!("Configuration {} is not for product {}", id, product_id),
                )
                .with_detail("configurationId", id)
                .with_detail("productId", product_id.as_str())
                .into());
            }

            let product = self.active_product(&current.product_id).await?;
            let selection = changes
                .attributes
                .iter()
                .fold(current.selection, |sel, change| sel.with_change(*change));
            let quantity = changes.quantity.unwrap_or(i64::from(current.quantity));
            let breakdown = pricing::calculate_for_product(&product, selection, quantity)?;
            check_expected("totalPrice", breakdown.total_price, guard.expected_total)?;

            let update = update_from(&product.id, selection, &breakdown);
            match self
                .catalog
                .store()
                .update_configuration(id, current.version, update, now_millis())
                .await
            {
                Ok(written) => {
                    tracing::info!(
                        config_id = %id,
                        version = written.version,
                        quantity = written.quantity,
                        total = %written.total_price,
                        empty = changes.is_empty(),
                        "Configuration updated"
                    );
                    return Ok(written);
                }
                Err(StoreError::VersionConflict { expected, actual, .. })
                    if guard.expected_version.is_some() =>
                {
                    return Err(version_conflict(id, expected, actual).into());
                }
                Err(StoreError::VersionConflict { .. }) => {
                    tracing::debug!(config_id = %id, attempt, "Concurrent write, retrying");
                }
                Err(StoreError::NotFound { .. }) => {
                    return Err(configuration_not_found(id).into());
                }
                Err(e) => return Err(ServiceError::Store(e)),
            }
        }

        tracing::warn!(config_id = %id, attempts = MAX_WRITE_ATTEMPTS, "Configuration write kept conflicting");
        Err(AppError::with_message(
            ErrorCode::ConfigurationVersionConflict,
            format!("Configuration {} is being modified concurrently", id),
        )
        .with_detail("configurationId", id)
        .into())
    }
}
