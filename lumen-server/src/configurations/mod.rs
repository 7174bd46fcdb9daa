//! Configuration aggregate
//!
//! Every write re-reads the configuration from the store, re-prices it from
//! catalog data and persists the whole row with a version compare-and-set.

mod manager;

pub use manager::{ConfigurationChanges, ConfigurationManager, MAX_WRITE_ATTEMPTS, WriteGuard};
pub(crate) use manager::{check_expected, ensure_access};
