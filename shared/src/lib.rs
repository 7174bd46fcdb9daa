//! Shared types for the Lumen storefront
//!
//! Common types used across crates: the unified error system, catalog and
//! order models, and small utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
