//! Fixture specification
//!
//! Physical shape of a product. Known shapes are typed; anything else a
//! catalog source carries goes in the explicit `extensions` map untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Known fixture shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixtureShape {
    Chandelier {
        arm_count: u32,
    },
    WallLight {
        arm_count: u32,
    },
    Pendant {
        cable_length_cm: u32,
    },
    Spotlight {
        beam_angle_deg: u32,
    },
}

/// Product specification: a known shape plus opaque extension fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSpec {
    #[serde(flatten)]
    pub shape: FixtureShape,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, Value>,
}

impl FixtureSpec {
    pub fn new(shape: FixtureShape) -> Self {
        Self {
            shape,
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Number of lamp sockets; single-lamp shapes count as one
    pub fn arm_count(&self) -> u32 {
        match self.shape {
            FixtureShape::Chandelier { arm_count } | FixtureShape::WallLight { arm_count } => {
                arm_count
            }
            FixtureShape::Pendant { .. } | FixtureShape::Spotlight { .. } => 1,
        }
    }
}
