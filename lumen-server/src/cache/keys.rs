//! Cache key builders and TTL tiers
//!
//! Every distinct query shape maps to a distinct key:
//!
//! | Key | Tier |
//! |-----|------|
//! | `product:{id}:{locale}` | detail |
//! | `products:list:{locale}:p{page}:n{per_page}:{filter_hash}` | list |
//! | `category:{id}:{locale}` | detail |
//! | `search:{locale}:{query_hash}:p{page}` | search |
//! | `translations:{locale}:{namespace}` | translations |

use sha2::{Digest, Sha256};
use std::time::Duration;

pub const PRODUCT_LIST_PATTERN: &str = "products:list:*";
pub const SEARCH_PATTERN: &str = "search:*";

/// Hex characters kept from a SHA-256 digest
const HASH_LEN: usize = 16;

/// TTL tier by volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    List,
    Search,
    Detail,
    Translations,
}

impl CacheTier {
    pub fn ttl(&self) -> Duration {
        match self {
            Self::List => Duration::from_secs(60),
            Self::Search => Duration::from_secs(300),
            Self::Detail => Duration::from_secs(900),
            Self::Translations => Duration::from_secs(3600),
        }
    }
}

/// Short stable hash of a query fragment
pub fn hash_fragment(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(HASH_LEN);
    encoded
}

pub fn product(id: &str, locale: &str) -> String {
    format!("product:{}:{}", id, locale)
}

/// Every locale variant of one product
pub fn product_pattern(id: &str) -> String {
    format!("product:{}:*", id)
}

pub fn product_list(locale: &str, page: u32, per_page: u32, filter: &str) -> String {
    format!(
        "products:list:{}:p{}:n{}:{}",
        locale,
        page,
        per_page,
        hash_fragment(filter)
    )
}

pub fn category(id: &str, locale: &str) -> String {
    format!("category:{}:{}", id, locale)
}

pub fn search(locale: &str, query: &str, page: u32) -> String {
    let normalized = query.trim().to_lowercase();
    format!("search:{}:{}:p{}", locale, hash_fragment(&normalized), page)
}

pub fn translations(locale: &str, namespace: &str) -> String {
    format!("translations:{}:{}", locale, namespace)
}
