//! Discount representation
//!
//! Catalog sources express discounts either as a ratio (`0.1`) or as a
//! percentage (`10`). Both are converted exactly once, at the input boundary,
//! into [`DiscountRate`]; everything downstream works with the ratio only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountError {
    #[error("discount ratio must be within [0, 1], got {0}")]
    RatioOutOfRange(Decimal),
    #[error("discount percent must be within [0, 100], got {0}")]
    PercentOutOfRange(Decimal),
}

/// Discount ratio guaranteed to lie within `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct DiscountRate(Decimal);

impl DiscountRate {
    pub const ZERO: DiscountRate = DiscountRate(Decimal::ZERO);

    /// Build from a ratio (`0.1` = 10%)
    pub fn from_ratio(ratio: Decimal) -> Result<Self, DiscountError> {
        if ratio < Decimal::ZERO || ratio > Decimal::ONE {
            return Err(DiscountError::RatioOutOfRange(ratio));
        }
        Ok(Self(ratio.normalize()))
    }

    /// Build from a percentage (`10` = 10%)
    pub fn from_percent(percent: Decimal) -> Result<Self, DiscountError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(DiscountError::PercentOutOfRange(percent));
        }
        Ok(Self((percent / Decimal::ONE_HUNDRED).normalize()))
    }

    pub fn ratio(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl<'de> Deserialize<'de> for DiscountRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let ratio = <Decimal as Deserialize>::deserialize(deserializer)?;
        DiscountRate::from_ratio(ratio).map_err(serde::de::Error::custom)
    }
}

/// Discount as supplied by a catalog source
///
/// ```json
/// { "ratio": 0.1 }
/// { "percent": 10 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscountInput {
    Ratio(Decimal),
    Percent(Decimal),
}

impl TryFrom<DiscountInput> for DiscountRate {
    type Error = DiscountError;

    fn try_from(input: DiscountInput) -> Result<Self, Self::Error> {
        match input {
            DiscountInput::Ratio(r) => DiscountRate::from_ratio(r),
            DiscountInput::Percent(p) => DiscountRate::from_percent(p),
        }
    }
}
