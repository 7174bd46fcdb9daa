//! Data models
//!
//! Shared between lumen-server and clients (via API).
//! All IDs are UUID strings, all timestamps are Unix milliseconds.

pub mod attribute;
pub mod configuration;
pub mod discount;
pub mod order;
pub mod product;
pub mod shipping_address;
pub mod specification;

// Re-exports
pub use attribute::*;
pub use configuration::*;
pub use discount::*;
pub use order::*;
pub use product::*;
pub use shipping_address::*;
pub use specification::*;
