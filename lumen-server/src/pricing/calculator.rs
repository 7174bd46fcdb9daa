//! Configuration Price Calculator
//!
//! Pure price computation for a configured fixture:
//!
//! ```text
//! price_increase      = ceil(base_price x ip_rate)
//! lamp_price_increase = lamp_rate x arm_count
//! unit_price          = base_price + price_increase + lamp_price_increase
//! subtotal            = unit_price x quantity
//! discount_amount     = subtotal x discount        (0 when discount = 0)
//! total_price         = subtotal - discount_amount + shipping_price
//! ```
//!
//! Rounding happens once, at the IP increase. Nothing downstream rounds again.
//!
//! Uses rust_decimal for precision calculations.

use rust_decimal::prelude::*;
use shared::models::{AttributeKind, AttributeSelection, DiscountRate, PriceModifiers, Product};
use serde::Serialize;

use super::PricingError;

/// Decimal places used when comparing monetary values
const DECIMAL_PLACES: u32 = 2;

/// Largest quantity a single configuration may carry
pub const MAX_QUANTITY: i64 = 9_999;

/// Inputs of one price computation
#[derive(Debug, Clone)]
pub struct PricingInput<'a> {
    pub base_price: Decimal,
    pub modifiers: &'a PriceModifiers,
    pub arm_count: u32,
    pub selection: AttributeSelection,
    pub quantity: i64,
    pub discount: DiscountRate,
    pub shipping_price: Decimal,
}

impl<'a> PricingInput<'a> {
    /// Build the input from canonical product data
    pub fn for_product(product: &'a Product, selection: AttributeSelection, quantity: i64) -> Self {
        Self {
            base_price: product.base_price,
            modifiers: &product.price_modifiers,
            arm_count: product.specification.arm_count(),
            selection,
            quantity,
            discount: product.discount,
            shipping_price: product.shipping_price,
        }
    }
}

/// Result of a price computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base_price: Decimal,
    pub price_increase: Decimal,
    pub lamp_price_increase: Decimal,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
    pub discount_rate: DiscountRate,
    pub discount_amount: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
}

/// Price fields frozen onto an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricing {
    /// Undiscounted subtotal
    pub product_price: Decimal,
    pub discount_rate: DiscountRate,
    pub discounted_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
}

// ==================== Helpers ====================

/// Round a monetary value for display and comparison (2 dp, half away from zero)
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Whether a client-submitted amount matches a server amount
#[inline]
pub fn amounts_match(server: Decimal, submitted: Decimal) -> bool {
    round_money(server) == round_money(submitted)
}

fn validate_catalog(input: &PricingInput<'_>) -> Result<(), PricingError> {
    if input.base_price <= Decimal::ZERO {
        return Err(PricingError::InvalidCatalogData(format!(
            "base price must be positive, got {}",
            input.base_price
        )));
    }
    if input.shipping_price < Decimal::ZERO {
        return Err(PricingError::InvalidCatalogData(format!(
            "shipping price must not be negative, got {}",
            input.shipping_price
        )));
    }
    input
        .modifiers
        .validate()
        .map_err(|e| PricingError::InvalidCatalogData(e.to_string()))
}

fn overflow(step: &str) -> PricingError {
    PricingError::InvalidCatalogData(format!("{} overflows the decimal range", step))
}

fn mul(a: Decimal, b: Decimal, step: &str) -> Result<Decimal, PricingError> {
    a.checked_mul(b).ok_or_else(|| overflow(step))
}

fn add(a: Decimal, b: Decimal, step: &str) -> Result<Decimal, PricingError> {
    a.checked_add(b).ok_or_else(|| overflow(step))
}

fn validate_quantity(quantity: i64) -> Result<u32, PricingError> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(PricingError::InvalidQuantity(quantity));
    }
    u32::try_from(quantity).map_err(|_| PricingError::InvalidQuantity(quantity))
}

// ==================== Calculation ====================

/// Compute the full breakdown for a configuration
pub fn calculate(input: &PricingInput<'_>) -> Result<PriceBreakdown, PricingError> {
    validate_catalog(input)?;
    let quantity = validate_quantity(input.quantity)?;

    let ip = input.selection.ip_rating;
    let ip_rate = input
        .modifiers
        .ip_rate(ip)
        .ok_or_else(|| PricingError::unknown(AttributeKind::IpRating, ip.as_str()))?;

    let lamp = input.selection.lamp_type;
    let lamp_rate = input
        .modifiers
        .lamp_rate(lamp)
        .ok_or_else(|| PricingError::unknown(AttributeKind::LampType, lamp.as_str()))?;

    // Step 1: the only rounding in the pipeline
    let price_increase = mul(input.base_price, ip_rate, "ip increase")?.ceil();
    // Step 2: lamp rates are whole currency units already
    let lamp_price_increase = mul(lamp_rate, Decimal::from(input.arm_count), "lamp increase")?;
    // Step 3
    let unit_price = add(
        add(input.base_price, price_increase, "unit price")?,
        lamp_price_increase,
        "unit price",
    )?;
    // Step 4
    let subtotal = mul(unit_price, Decimal::from(quantity), "subtotal")?;
    // Step 5
    let discount_amount = if input.discount.is_zero() {
        Decimal::ZERO
    } else {
        mul(subtotal, input.discount.ratio(), "discount amount")?
    };
    // Step 6
    let total_price = add(subtotal - discount_amount, input.shipping_price, "total")?;

    Ok(PriceBreakdown {
        base_price: input.base_price,
        price_increase,
        lamp_price_increase,
        unit_price,
        quantity,
        subtotal,
        discount_rate: input.discount,
        discount_amount,
        shipping_price: input.shipping_price,
        total_price,
    })
}

/// Compute the breakdown straight from a product
pub fn calculate_for_product(
    product: &Product,
    selection: AttributeSelection,
    quantity: i64,
) -> Result<PriceBreakdown, PricingError> {
    calculate(&PricingInput::for_product(product, selection, quantity))
}

/// Derive the price fields of an order from a recomputed breakdown
///
/// `discounted_price` is rounded up to a whole unit when a discount applies.
pub fn order_pricing(breakdown: &PriceBreakdown) -> Result<OrderPricing, PricingError> {
    let product_price = breakdown.subtotal;
    let discounted_price = if breakdown.discount_rate.is_zero() {
        product_price
    } else {
        mul(
            product_price,
            Decimal::ONE - breakdown.discount_rate.ratio(),
            "discounted price",
        )?
        .ceil()
    };

    Ok(OrderPricing {
        product_price,
        discount_rate: breakdown.discount_rate,
        discounted_price,
        shipping_price: breakdown.shipping_price,
        total_price: add(discounted_price, breakdown.shipping_price, "order total")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ColorTemperature, IpRating, LampType};

    fn modifiers() -> PriceModifiers {
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
            ]
            .into_iter()
            .collect(),
        }
    }

    fn selection(ip: IpRating, lamp: LampType) -> AttributeSelection {
        AttributeSelection {
            ip_rating: ip,
            lamp_type: lamp,
            color_temperature: ColorTemperature::K3000,
        }
    }

    fn make_input(
        modifiers: &PriceModifiers,
        base: i64,
        ip: IpRating,
        quantity: i64,
        discount_pct: i64,
    ) -> PricingInput<'_> {
        PricingInput {
            base_price: Decimal::from(base),
            modifiers,
            arm_count: 3,
            selection: selection(ip, LampType::Lamp9w),
            quantity,
            discount: DiscountRate::from_percent(Decimal::from(discount_pct)).unwrap(),
            shipping_price: Decimal::from(69),
        }
    }

    #[test]
    fn test_worked_example() {
        let m = modifiers();
        let input = make_input(&m, 1000, IpRating::Ip44, 2, 10);
        let result = calculate(&input).unwrap();

        assert_eq!(result.price_increase, Decimal::from(20));
        assert_eq!(result.lamp_price_increase, Decimal::ZERO);
        assert_eq!(result.unit_price, Decimal::from(1020));
        assert_eq!(result.subtotal, Decimal::from(2040));
        assert_eq!(result.discount_amount, Decimal::from(204));
        assert_eq!(result.total_price, Decimal::from(1905));
    }

    #[test]
    fn test_ip_increase_rounds_up_once() {
        let m = modifiers();
        // 999 x 2% = 19.98
        let input = make_input(&m, 999, IpRating::Ip44, 3, 0);
        let result = calculate(&input).unwrap();
        assert_eq!(result.price_increase, Decimal::from(20));
        assert_eq!(result.unit_price, Decimal::from(1019));
        assert_eq!(result.subtotal, Decimal::from(3057));
    }

    #[test]
    fn test_lamp_increase_scales_with_arms() {
        let m = modifiers();
        let mut input = make_input(&m, 1000, IpRating::Ip20, 1, 0);
        input.selection = selection(IpRating::Ip20, LampType::Lamp12w);
        input.arm_count = 6;
        let result = calculate(&input).unwrap();
        assert_eq!(result.lamp_price_increase, Decimal::from(300));
        assert_eq!(result.unit_price, Decimal::from(1300));
    }

    #[test]
    fn test_calculation_is_deterministic() {
        let m = modifiers();
        for ip in IpRating::ALL {
            for quantity in 1..5 {
                let input = make_input(&m, 1234, ip, quantity, 15);
                assert_eq!(calculate(&input).unwrap(), calculate(&input).unwrap());
            }
        }
    }

    #[test]
    fn test_higher_ip_never_costs_less() {
        let m = modifiers();
        for base in [1, 99, 1000, 4567] {
            let increases: Vec<Decimal> = IpRating::ALL
                .into_iter()
                .map(|ip| calculate(&make_input(&m, base, ip, 1, 0)).unwrap().price_increase)
                .collect();
            assert!(increases.windows(2).all(|w| w[0] <= w[1]), "base {}", base);
        }
    }

    #[test]
    fn test_more_quantity_never_lowers_subtotal() {
        let m = modifiers();
        let mut previous = Decimal::ZERO;
        for quantity in 1..20 {
            let subtotal = calculate(&make_input(&m, 850, IpRating::Ip65, quantity, 25))
                .unwrap()
                .subtotal;
            assert!(subtotal >= previous);
            previous = subtotal;
        }
    }

    #[test]
    fn test_zero_discount_means_no_discount_amount() {
        let m = modifiers();
        let result = calculate(&make_input(&m, 1000, IpRating::Ip54, 4, 0)).unwrap();
        assert_eq!(result.discount_amount, Decimal::ZERO);
        assert_eq!(result.total_price, result.subtotal + Decimal::from(69));
    }

    #[test]
    fn test_invalid_quantity() {
        let m = modifiers();
        for quantity in [0, -1, MAX_QUANTITY + 1] {
            let err = calculate(&make_input(&m, 1000, IpRating::Ip20, quantity, 0)).unwrap_err();
            assert_eq!(err, PricingError::InvalidQuantity(quantity));
        }
    }

    #[test]
    fn test_non_positive_base_price_is_catalog_error() {
        let m = modifiers();
        let err = calculate(&make_input(&m, 0, IpRating::Ip20, 1, 0)).unwrap_err();
        assert!(matches!(err, PricingError::InvalidCatalogData(_)));
    }

    #[test]
    fn test_missing_table_entry_is_unknown_attribute() {
        let m = modifiers();
        let mut input = make_input(&m, 1000, IpRating::Ip20, 1, 0);
        input.selection = selection(IpRating::Ip20, LampType::Lamp24w);
        let err = calculate(&input).unwrap_err();
        assert_eq!(
            err,
            PricingError::UnknownAttributeValue {
                kind: AttributeKind::LampType,
                value: "lamp24w".to_string(),
            }
        );
    }

    #[test]
    fn test_broken_modifier_table_is_catalog_error() {
        let mut m = modifiers();
        m.ip_rates.insert(IpRating::Ip68, Decimal::new(1, 2));
        let err = calculate(&make_input(&m, 1000, IpRating::Ip20, 1, 0)).unwrap_err();
        assert!(matches!(err, PricingError::InvalidCatalogData(_)));
    }

    #[test]
    fn test_overflow_is_catalog_error() {
        let m = modifiers();
        let mut input = make_input(&m, 1000, IpRating::Ip20, MAX_QUANTITY, 0);
        input.base_price = Decimal::MAX / Decimal::from(1000);
        let err = calculate(&input).unwrap_err();
        assert!(matches!(err, PricingError::InvalidCatalogData(_)));
    }

    #[test]
    fn test_order_pricing_rounds_discounted_price_up() {
        let m = modifiers();
        let result = calculate(&make_input(&m, 1000, IpRating::Ip44, 2, 10)).unwrap();
        let order = order_pricing(&result).unwrap();
        assert_eq!(order.product_price, Decimal::from(2040));
        assert_eq!(order.discounted_price, Decimal::from(1836));
        assert_eq!(order.total_price, Decimal::from(1905));

        // 1001 x 0.85 = 850.85
        let result = calculate(&make_input(&m, 1001, IpRating::Ip20, 1, 15)).unwrap();
        let order = order_pricing(&result).unwrap();
        assert_eq!(order.discounted_price, Decimal::from(851));
        assert_eq!(order.total_price, Decimal::from(920));
    }

    #[test]
    fn test_order_pricing_without_discount() {
        let m = modifiers();
        let result = calculate(&make_input(&m, 500, IpRating::Ip20, 2, 0)).unwrap();
        let order = order_pricing(&result).unwrap();
        assert_eq!(order.discounted_price, order.product_price);
        assert_eq!(order.total_price, Decimal::from(1069));
    }

    #[test]
    fn test_amounts_match_at_two_decimals() {
        assert!(amounts_match(Decimal::new(190500, 2), Decimal::from(1905)));
        assert!(amounts_match(Decimal::new(1234567, 3), Decimal::new(123457, 2)));
        assert!(!amounts_match(Decimal::from(1905), Decimal::from(1800)));
    }
}
