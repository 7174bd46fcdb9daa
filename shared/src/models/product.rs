//! Product Model

use super::attribute::{AttributeSelection, IpRating, LampType};
use super::discount::{DiscountInput, DiscountRate};
use super::specification::FixtureSpec;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceModifierError {
    #[error("negative IP rate for {0}")]
    NegativeIpRate(IpRating),
    #[error("negative lamp rate for {0}")]
    NegativeLampRate(LampType),
    #[error("IP rate table is not monotonic at {0}")]
    NonMonotonicIpRates(IpRating),
}

/// Per-attribute price modifier tables
///
/// `ip_rates` are ratios of the base price (`0.02` = +2%), `lamp_rates` are
/// whole currency units per arm.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModifiers {
    pub ip_rates: BTreeMap<IpRating, Decimal>,
    pub lamp_rates: BTreeMap<LampType, Decimal>,
}

impl PriceModifiers {
    pub fn ip_rate(&self, ip: IpRating) -> Option<Decimal> {
        self.ip_rates.get(&ip).copied()
    }

    pub fn lamp_rate(&self, lamp: LampType) -> Option<Decimal> {
        self.lamp_rates.get(&lamp).copied()
    }

    /// Rates are non-negative and a higher IP rating never costs less
    pub fn validate(&self) -> Result<(), PriceModifierError> {
        let mut previous = Decimal::ZERO;
        // BTreeMap iterates in IpRating order
        for (ip, rate) in &self.ip_rates {
            if *rate < Decimal::ZERO {
                return Err(PriceModifierError::NegativeIpRate(*ip));
            }
            if *rate < previous {
                return Err(PriceModifierError::NonMonotonicIpRates(*ip));
            }
            previous = *rate;
        }
        for (lamp, rate) in &self.lamp_rates {
            if *rate < Decimal::ZERO {
                return Err(PriceModifierError::NegativeLampRate(*lamp));
            }
        }
        Ok(())
    }
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub base_price: Decimal,
    pub discount: DiscountRate,
    pub price_modifiers: PriceModifiers,
    pub specification: FixtureSpec,
    /// Selection a fresh configuration starts from
    pub default_selection: AttributeSelection,
    pub shipping_price: Decimal,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
///
/// The discount arrives in whatever form the catalog source uses and is
/// normalized once when the product is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub id: Option<String>,
    pub name: String,
    pub base_price: Decimal,
    pub discount: Option<DiscountInput>,
    pub price_modifiers: PriceModifiers,
    pub specification: FixtureSpec,
    pub default_selection: AttributeSelection,
    pub shipping_price: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Product list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub base_price: Decimal,
    pub discount: DiscountRate,
    pub is_active: bool,
}

impl From<&Product> for ProductSummary {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            base_price: p.base_price,
            discount: p.discount,
            is_active: p.is_active,
        }
    }
}
