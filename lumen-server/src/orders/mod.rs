//! Order finalization
//!
//! Orders are priced from a fresh product read and frozen at creation.

mod finalizer;

pub use finalizer::{CreateOrderCommand, OrderFinalizer, PricingCheck, PricingValidation};
