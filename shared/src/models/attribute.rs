//! Attribute Model
//!
//! Selectable product dimensions. IP rating and lamp wattage carry a price
//! modifier; color temperature does not.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Selectable attribute dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKind {
    IpRating,
    LampType,
    ColorTemperature,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IpRating => "ipRating",
            Self::LampType => "lampType",
            Self::ColorTemperature => "colorTemperature",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string does not name a known attribute value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownAttribute {
    pub kind: AttributeKind,
    pub value: String,
}

/// Ingress protection rating, ordered from least to most protected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IpRating {
    #[serde(rename = "IP20")]
    Ip20,
    #[serde(rename = "IP44")]
    Ip44,
    #[serde(rename = "IP54")]
    Ip54,
    #[serde(rename = "IP65")]
    Ip65,
    #[serde(rename = "IP68")]
    Ip68,
}

impl IpRating {
    pub const ALL: [IpRating; 5] = [
        IpRating::Ip20,
        IpRating::Ip44,
        IpRating::Ip54,
        IpRating::Ip65,
        IpRating::Ip68,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ip20 => "IP20",
            Self::Ip44 => "IP44",
            Self::Ip54 => "IP54",
            Self::Ip65 => "IP65",
            Self::Ip68 => "IP68",
        }
    }
}

impl FromStr for IpRating {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IpRating::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAttribute {
                kind: AttributeKind::IpRating,
                value: s.to_string(),
            })
    }
}

impl fmt::Display for IpRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lamp wattage per arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LampType {
    #[serde(rename = "lamp9w")]
    Lamp9w,
    #[serde(rename = "lamp12w")]
    Lamp12w,
    #[serde(rename = "lamp18w")]
    Lamp18w,
    #[serde(rename = "lamp24w")]
    Lamp24w,
}

impl LampType {
    pub const ALL: [LampType; 4] = [
        LampType::Lamp9w,
        LampType::Lamp12w,
        LampType::Lamp18w,
        LampType::Lamp24w,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lamp9w => "lamp9w",
            Self::Lamp12w => "lamp12w",
            Self::Lamp18w => "lamp18w",
            Self::Lamp24w => "lamp24w",
        }
    }

    pub fn watts(&self) -> u32 {
        match self {
            Self::Lamp9w => 9,
            Self::Lamp12w => 12,
            Self::Lamp18w => 18,
            Self::Lamp24w => 24,
        }
    }
}

impl FromStr for LampType {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LampType::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAttribute {
                kind: AttributeKind::LampType,
                value: s.to_string(),
            })
    }
}

impl fmt::Display for LampType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Light color temperature (no price effect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorTemperature {
    #[serde(rename = "2700k")]
    K2700,
    #[serde(rename = "3000k")]
    K3000,
    #[serde(rename = "4000k")]
    K4000,
    #[serde(rename = "6500k")]
    K6500,
}

impl ColorTemperature {
    pub const ALL: [ColorTemperature; 4] = [
        ColorTemperature::K2700,
        ColorTemperature::K3000,
        ColorTemperature::K4000,
        ColorTemperature::K6500,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::K2700 => "2700k",
            Self::K3000 => "3000k",
            Self::K4000 => "4000k",
            Self::K6500 => "6500k",
        }
    }
}

impl FromStr for ColorTemperature {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorTemperature::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAttribute {
                kind: AttributeKind::ColorTemperature,
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ColorTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full attribute selection of a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSelection {
    pub ip_rating: IpRating,
    pub lamp_type: LampType,
    pub color_temperature: ColorTemperature,
}

/// A single attribute change requested by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeChange {
    IpRating(IpRating),
    LampType(LampType),
    ColorTemperature(ColorTemperature),
}

impl AttributeChange {
    /// Parse a raw `(attribute, value)` pair coming from a client
    pub fn parse(kind: AttributeKind, value: &str) -> Result<Self, UnknownAttribute> {
        Ok(match kind {
            AttributeKind::IpRating => Self::IpRating(value.parse()?),
            AttributeKind::LampType => Self::LampType(value.parse()?),
            AttributeKind::ColorTemperature => Self::ColorTemperature(value.parse()?),
        })
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::IpRating(_) => AttributeKind::IpRating,
            Self::LampType(_) => AttributeKind::LampType,
            Self::ColorTemperature(_) => AttributeKind::ColorTemperature,
        }
    }
}

impl AttributeSelection {
    /// Return a copy with one attribute replaced
    pub fn with_change(mut self, change: AttributeChange) -> Self {
        match change {
            AttributeChange::IpRating(v) => self.ip_rating = v,
            AttributeChange::LampType(v) => self.lamp_type = v,
            AttributeChange::ColorTemperature(v) => self.color_temperature = v,
        }
        self
    }
}
