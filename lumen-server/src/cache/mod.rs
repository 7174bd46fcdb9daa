//! Cache Layer Module
//!
//! # Structure
//!
//! - [`kv`] - KV store port, in-memory backend, glob matching
//! - [`keys`] - key builders and TTL tiers
//! - [`layer`] - fail-open cache-aside wrapper

pub mod keys;
pub mod kv;
mod layer;

#[cfg(test)]
pub(crate) mod testing;

pub use keys::CacheTier;
pub use kv::{KvError, KvStore, MemoryKv, bounded, glob_match};
pub use layer::CacheLayer;
