use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Configuration, Order, OrderStatus, Product, ShippingAddressInput};
use shared::util::{new_id, now_millis};

use crate::auth::CurrentUser;
use crate::catalog::{CachedCatalog, StoreError};
use crate::configurations::{check_expected, ensure_access};
use crate::pricing::{self, OrderPricing, PriceBreakdown};
use crate::security_log;
use crate::utils::validation::validate_input;
use crate::utils::{ServiceError, ServiceResult};

/// Order creation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderCommand {
    pub configuration_id: String,
    pub quantity: i64,
    pub shipping_address: ShippingAddressInput,
    /// Cross-checked against the recomputed configuration total, the same
    /// figure configuration reads and pricing validation report
    #[serde(default)]
    pub expected_total: Option<Decimal>,
    /// Cross-checked against the order's rounded discounted price
    #[serde(default)]
    pub expected_discounted_price: Option<Decimal>,
}

/// Pre-order pricing check
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingCheck {
    pub configuration_id: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub expected_total: Option<Decimal>,
}

/// Result of a pricing check
///
/// The breakdown fields sit at the top level; `order` holds the figures an
/// order placed now would be frozen with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingValidation {
    #[serde(flatten)]
    pub breakdown: PriceBreakdown,
    pub order: OrderPricing,
}

fn not_found(id: &str) -> AppError {
    AppError::with_message(
        ErrorCode::ConfigurationNotFound,
        format!("Configuration {} not found", id),
    )
    .with_detail("configurationId", id)
}

fn order_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
        .with_detail("orderId", id)
}

fn invalid_transition(from: OrderStatus, to: OrderStatus) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidStatusTransition,
        format!("Cannot move an order from {} to {}", from, to),
    )
    .with_detail("from", from.as_str())
    .with_detail("to", to.as_str())
}

/// Order finalizer
#[derive(Clone)]
pub struct OrderFinalizer {
    catalog: CachedCatalog,
}

impl OrderFinalizer {
    pub fn new(catalog: CachedCatalog) -> Self {
        Self { catalog }
    }

    /// Load a configuration the caller may price or order
    async fn owned_configuration(
        &self,
        user: &CurrentUser,
        id: &str,
    ) -> ServiceResult<Configuration> {
        let configuration = self
            .catalog
            .store()
            .find_configuration(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        ensure_access(&configuration, Some(user.id.as_str()))?;
        Ok(configuration)
    }

    /// Product read past the cache, so `is_active` and prices are current
    async fn fresh_active_product(&self, product_id: &str) -> ServiceResult<Product> {
        match self.catalog.product_fresh(product_id).await? {
            Some(p) if p.is_active => Ok(p),
            Some(_) => {
                tracing::info!(product_id, "Order rejected, product inactive");
                Err(AppError::with_message(
                    ErrorCode::ProductUnavailable,
                    format!("Product {} is no longer available", product_id),
                )
                .with_detail("productId", product_id)
                .into())
            }
            None => Err(AppError::with_message(
                ErrorCode::ProductUnavailable,
                format!("Product {} is not available", product_id),
            )
            .with_detail("productId", product_id)
            .into()),
        }
    }

    /// Recompute a configuration's price without writing anything
    pub async fn validate_pricing(
        &self,
        user: &CurrentUser,
        check: &PricingCheck,
    ) -> ServiceResult<PricingValidation> {
        let configuration = self.owned_configuration(user, &check.configuration_id).await?;
        let product = self.fresh_active_product(&configuration.product_id).await?;
        let quantity = check.quantity.unwrap_or(i64::from(configuration.quantity));
        let breakdown =
            pricing::calculate_for_product(&product, configuration.selection, quantity)?;
        check_expected("totalPrice", breakdown.total_price, check.expected_total)?;
        let order = pricing::order_pricing(&breakdown)?;
        Ok(PricingValidation { breakdown, order })
    }

    /// Create an immutable order from a configuration
    ///
    /// Client price fields are only cross-checked; the order is priced from
    /// the product as stored right now. Once the order is stored, the user's
    /// single shipping address is overwritten with the submitted one.
    pub async fn create_order(
        &self,
        user: &CurrentUser,
        cmd: CreateOrderCommand,
    ) -> ServiceResult<Order> {
        validate_input(&cmd.shipping_address)?;

        let configuration = self.owned_configuration(user, &cmd.configuration_id).await?;
        let product = self.fresh_active_product(&configuration.product_id).await?;

        let breakdown =
            pricing::calculate_for_product(&product, configuration.selection, cmd.quantity)?;
        let priced = pricing::order_pricing(&breakdown)?;
        check_expected("totalPrice", breakdown.total_price, cmd.expected_total)?;
        check_expected(
            "discountedPrice",
            priced.discounted_price,
            cmd.expected_discounted_price,
        )?;

        let now = now_millis();
        let address = cmd.shipping_address.into_address(user.id.as_str(), now);

        let order = Order {
            id: new_id(),
            user_id: user.id.clone(),
            product_id: product.id.clone(),
            configuration_id: configuration.id.clone(),
            selection: configuration.selection,
            quantity: breakdown.quantity,
            product_price: priced.product_price,
            discount_rate: priced.discount_rate,
            discounted_price: priced.discounted_price,
            shipping_price: priced.shipping_price,
            total_price: priced.total_price,
            shipping_address: address,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.catalog.store().create_order(order.clone()).await?;

        // Order is stored; an address failure is logged only
        if let Err(e) = self
            .catalog
            .store()
            .upsert_shipping_address(order.shipping_address.clone())
            .await
        {
            tracing::error!(order_id = %order.id, user_id = %order.user_id, error = %e, "Failed to save shipping address");
        }

        tracing::info!(
            order_id = %order.id,
            config_id = %order.configuration_id,
            user_id = %order.user_id,
            quantity = order.quantity,
            total = %order.total_price,
            "Order created"
        );
        Ok(order)
    }

    /// An order visible to the caller
    pub async fn get_order(&self, user: &CurrentUser, id: &str) -> ServiceResult<Order> {
        let order = self
            .catalog
            .store()
            .find_order(id)
            .await?
            .ok_or_else(|| order_not_found(id))?;

        if order.user_id != user.id && !user.is_staff() {
            security_log!(
                "WARN",
                "order_foreign_access",
                user_id = user.id.as_str(),
                order_id = id
            );
            return Err(AppError::forbidden("Order belongs to another user").into());
        }
        Ok(order)
    }

    /// Move an order along its status machine
    ///
    /// Customers may only cancel their own orders; staff may apply any
    /// allowed transition. Price fields are never touched.
    pub async fn transition_status(
        &self,
        user: &CurrentUser,
        id: &str,
        next: OrderStatus,
    ) -> ServiceResult<Order> {
        let current = self.get_order(user, id).await?;

        if !user.is_staff() && next != OrderStatus::Cancelled {
            return Err(AppError::forbidden("Only staff can advance an order").into());
        }
        if !current.status.can_transition_to(next) {
            return Err(invalid_transition(current.status, next).into());
        }

        match self
            .catalog
            .store()
            .update_order_status(id, current.status, next, now_millis())
            .await
        {
            Ok(order) => {
                tracing::info!(order_id = %id, from = %current.status, to = %next, "Order status changed");
                Ok(order)
            }
            // Someone else moved it first
            Err(StoreError::StatusConflict { actual, .. }) => {
                Err(invalid_transition(actual, next).into())
            }
            Err(StoreError::NotFound { .. }) => Err(order_not_found(id).into()),
            Err(e) => Err(ServiceError::Store(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ROLE_CUSTOMER, ROLE_STAFF};
    use crate::cache::{CacheLayer, MemoryKv};
    use crate::catalog::testing::{FaultyStore, product};
    use crate::catalog::{CatalogStore, MemoryCatalog};
    use crate::configurations::{ConfigurationManager, WriteGuard};
    use shared::models::{AttributeChange, IpRating};
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        catalog: CachedCatalog,
        store: Arc<MemoryCatalog>,
        manager: ConfigurationManager,
        finalizer: OrderFinalizer,
    }

    async fn setup() -> Fixture {
        let store = Arc::new(MemoryCatalog::new());
        let cache = CacheLayer::new(Arc::new(MemoryKv::new()), Duration::from_millis(150));
        let catalog = CachedCatalog::new(store.clone(), cache);
        catalog.save_product(product("p1", 1000)).await.unwrap();
        Fixture {
            manager: ConfigurationManager::new(catalog.clone()),
            finalizer: OrderFinalizer::new(catalog.clone()),
            catalog,
            store,
        }
    }

    fn user(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            role: ROLE_CUSTOMER.to_string(),
        }
    }

    fn staff() -> CurrentUser {
        CurrentUser {
            id: "staff-1".to_string(),
            role: ROLE_STAFF.to_string(),
        }
    }

    fn address() -> ShippingAddressInput {
        ShippingAddressInput {
            recipient_name: " Ada Lovelace ".into(),
            street: "Storgatan 1".into(),
            city: "Stockholm".into(),
            postal_code: "11122".into(),
            country: "se".into(),
            phone: None,
            email: Some("Ada@Example.com".into()),
        }
    }

    fn command(configuration_id: &str, quantity: i64) -> CreateOrderCommand {
        CreateOrderCommand {
            configuration_id: configuration_id.to_string(),
            quantity,
            shipping_address: address(),
            expected_total: None,
            expected_discounted_price: None,
        }
    }

    /// Configuration at IP44, as in the worked example
    async fn ip44_configuration(f: &Fixture, owner: Option<&str>) -> Configuration {
        let (cfg, _) = f.manager.get_or_create("p1", None, owner).await.unwrap();
        f.manager
            .apply_attribute_change(
                &cfg.id,
                AttributeChange::IpRating(IpRating::Ip44),
                WriteGuard::default(),
            )
            .await
            .unwrap()
    }

    fn code(err: ServiceError) -> ErrorCode {
        AppError::from(err).code
    }

    #[tokio::test]
    async fn test_create_order_worked_example() {
        let f = setup().await;
        let cfg = ip44_configuration(&f, Some("user-1")).await;

        let mut cmd = command(&cfg.id, 2);
        cmd.expected_total = Some(Decimal::from(1905));
        cmd.expected_discounted_price = Some(Decimal::new(183600, 2));
        let order = f.finalizer.create_order(&user("user-1"), cmd).await.unwrap();

        assert_eq!(order.product_price, Decimal::from(2040));
        assert_eq!(order.discounted_price, Decimal::from(1836));
        assert_eq!(order.total_price, Decimal::from(1905));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.shipping_address.recipient_name, "Ada Lovelace");
        assert_eq!(order.shipping_address.country, "SE");

        let stored = f.store.find_shipping_address("user-1").await.unwrap().unwrap();
        assert_eq!(stored.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_orders_are_frozen_after_price_change() {
        let f = setup().await;
        let cfg = ip44_configuration(&f, None).await;
        let buyer = user("user-1");

        let first = f.finalizer.create_order(&buyer, command(&cfg.id, 2)).await.unwrap();
        let second = f.finalizer.create_order(&buyer, command(&cfg.id, 2)).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.total_price, second.total_price);

        f.catalog.save_product(product("p1", 5000)).await.unwrap();
        let reread = f.finalizer.get_order(&buyer, &first.id).await.unwrap();
        assert_eq!(reread.total_price, Decimal::from(1905));

        // New orders see the new price
        let third = f.finalizer.create_order(&buyer, command(&cfg.id, 2)).await.unwrap();
        assert!(third.total_price > first.total_price);
    }

    #[tokio::test]
    async fn test_order_uses_fresh_product() {
        let f = setup().await;
        let cfg = ip44_configuration(&f, None).await;

        // Write straight to the store so the cached product goes stale
        let mut retired = product("p1", 1000);
        retired.is_active = false;
        f.store.save_product(retired).await.unwrap();

        let err = f
            .finalizer
            .create_order(&user("user-1"), command(&cfg.id, 1))
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::ProductUnavailable);
        assert!(f.store.find_shipping_address("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_price_mismatch_writes_nothing() {
        let f = setup().await;
        let cfg = ip44_configuration(&f, None).await;

        let mut cmd = command(&cfg.id, 2);
        cmd.expected_total = Some(Decimal::from(1000));
        let err = AppError::from(
            f.finalizer
                .create_order(&user("user-1"), cmd)
                .await
                .unwrap_err(),
        );
        assert_eq!(err.code, ErrorCode::PriceMismatch);
        assert_eq!(err.detail("expected").and_then(|v| v.as_str()), Some("1905"));
        assert!(f.store.find_shipping_address("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_order_validation() {
        let f = setup().await;
        let cfg = ip44_configuration(&f, None).await;
        let buyer = user("user-1");

        let mut cmd = command(&cfg.id, 1);
        cmd.shipping_address.country = "Sweden".into();
        let err = f.finalizer.create_order(&buyer, cmd).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ValidationFailed);

        let err = f
            .finalizer
            .create_order(&buyer, command(&cfg.id, 0))
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidQuantity);

        let err = f
            .finalizer
            .create_order(&buyer, command("missing", 1))
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::ConfigurationNotFound);
    }

    #[tokio::test]
    async fn test_foreign_configuration_is_forbidden() {
        let f = setup().await;
        let cfg = ip44_configuration(&f, Some("user-1")).await;

        let err = f
            .finalizer
            .create_order(&user("user-2"), command(&cfg.id, 1))
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::PermissionDenied);

        let check = PricingCheck {
            configuration_id: cfg.id.clone(),
            quantity: None,
            expected_total: None,
        };
        let err = f
            .finalizer
            .validate_pricing(&user("user-2"), &check)
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_validate_pricing() {
        let f = setup().await;
        let cfg = ip44_configuration(&f, Some("user-1")).await;

        let check = PricingCheck {
            configuration_id: cfg.id.clone(),
            quantity: Some(2),
            expected_total: Some(Decimal::new(190500, 2)),
        };
        let result = f
            .finalizer
            .validate_pricing(&user("user-1"), &check)
            .await
            .unwrap();
        assert_eq!(result.breakdown.total_price, Decimal::from(1905));
        assert_eq!(result.order.discounted_price, Decimal::from(1836));
        assert_eq!(result.order.total_price, Decimal::from(1905));

        let check = PricingCheck {
            expected_total: Some(Decimal::from(1904)),
            ..check
        };
        let err = f
            .finalizer
            .validate_pricing(&user("user-1"), &check)
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::PriceMismatch);
    }

    #[tokio::test]
    async fn test_validated_total_is_accepted_at_checkout() {
        let f = setup().await;
        // 1001 at 10% off leaves a fractional discount
        f.catalog.save_product(product("p2", 1001)).await.unwrap();
        let (cfg, _) = f
            .manager
            .get_or_create("p2", None, Some("user-1"))
            .await
            .unwrap();
        let buyer = user("user-1");

        let check = PricingCheck {
            configuration_id: cfg.id.clone(),
            quantity: None,
            expected_total: None,
        };
        let quoted = f.finalizer.validate_pricing(&buyer, &check).await.unwrap();
        assert_eq!(quoted.breakdown.total_price, Decimal::new(9699, 1));
        assert_eq!(quoted.order.discounted_price, Decimal::from(901));
        assert_eq!(quoted.order.total_price, Decimal::from(970));

        let mut cmd = command(&cfg.id, 1);
        cmd.expected_total = Some(quoted.breakdown.total_price);
        cmd.expected_discounted_price = Some(quoted.order.discounted_price);
        let order = f.finalizer.create_order(&buyer, cmd).await.unwrap();
        assert_eq!(order.discounted_price, Decimal::from(901));
        assert_eq!(order.total_price, quoted.order.total_price);
    }

    #[tokio::test]
    async fn test_failed_order_keeps_saved_address() {
        let store = Arc::new(FaultyStore::new());
        let cache = CacheLayer::new(Arc::new(MemoryKv::new()), Duration::from_millis(150));
        let catalog = CachedCatalog::new(store.clone(), cache);
        catalog.save_product(product("p1", 1000)).await.unwrap();
        let manager = ConfigurationManager::new(catalog.clone());
        let finalizer = OrderFinalizer::new(catalog);
        let buyer = user("user-1");
        let (cfg, _) = manager.get_or_create("p1", None, None).await.unwrap();

        finalizer.create_order(&buyer, command(&cfg.id, 1)).await.unwrap();

        store.reject_orders();
        let mut cmd = command(&cfg.id, 1);
        cmd.shipping_address.city = "Malmö".into();
        let err = finalizer.create_order(&buyer, cmd).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::InternalError);

        let saved = store.find_shipping_address("user-1").await.unwrap().unwrap();
        assert_eq!(saved.city, "Stockholm");
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let f = setup().await;
        let cfg = ip44_configuration(&f, None).await;
        let buyer = user("user-1");
        let order = f.finalizer.create_order(&buyer, command(&cfg.id, 1)).await.unwrap();

        // Customers cannot advance orders
        let err = f
            .finalizer
            .transition_status(&buyer, &order.id, OrderStatus::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::PermissionDenied);

        let confirmed = f
            .finalizer
            .transition_status(&staff(), &order.id, OrderStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.total_price, order.total_price);

        let err = f
            .finalizer
            .transition_status(&staff(), &order.id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidStatusTransition);

        let cancelled = f
            .finalizer
            .transition_status(&buyer, &order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let err = f
            .finalizer
            .transition_status(&buyer, &order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidStatusTransition);
    }

    #[tokio::test]
    async fn test_foreign_order_is_hidden() {
        let f = setup().await;
        let cfg = ip44_configuration(&f, None).await;
        let order = f
            .finalizer
            .create_order(&user("user-1"), command(&cfg.id, 1))
            .await
            .unwrap();

        let err = f
            .finalizer
            .get_order(&user("user-2"), &order.id)
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::PermissionDenied);
        assert!(f.finalizer.get_order(&staff(), &order.id).await.is_ok());

        let err = f
            .finalizer
            .get_order(&user("user-1"), "missing")
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderNotFound);
    }
}
