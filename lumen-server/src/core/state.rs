//! Server state
//!
//! Every shared client (KV store, catalog, limiter, managers) is built once
//! here and handed to handlers by reference.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::auth::JwtService;
use crate::cache::{CacheLayer, KvStore, MemoryKv};
use crate::catalog::{CachedCatalog, CatalogStore, MemoryCatalog, seed};
use crate::configurations::ConfigurationManager;
use crate::core::{Config, Result, ServerError};
use crate::orders::OrderFinalizer;
use crate::rate_limit::RateLimiter;

/// Interval between sweeps of expired in-memory KV entries
const KV_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    catalog: CachedCatalog,
    rate_limiter: RateLimiter,
    configurations: ConfigurationManager,
    orders: OrderFinalizer,
    jwt: Arc<JwtService>,
    /// Set when the process owns an in-memory KV that needs sweeping
    memory_kv: Option<Arc<MemoryKv>>,
    started_at: Instant,
}

impl ServerState {
    /// Build the state on explicit backends
    pub fn with_backends(
        config: &Config,
        store: Arc<dyn CatalogStore>,
        kv: Arc<dyn KvStore>,
    ) -> Self {
        let cache = CacheLayer::new(kv.clone(), config.kv_timeout());
        let catalog = CachedCatalog::new(store, cache);
        let rate_limiter = RateLimiter::new(kv, config.rate_limits, config.kv_timeout());
        let jwt = JwtService::new(&config.idp_jwt_secret, config.idp_issuer.clone());

        Self {
            config: config.clone(),
            configurations: ConfigurationManager::new(catalog.clone()),
            orders: OrderFinalizer::new(catalog.clone()),
            catalog,
            rate_limiter,
            jwt: Arc::new(jwt),
            memory_kv: None,
            started_at: Instant::now(),
        }
    }

    /// Build the process state: in-memory catalog and KV, optional seed file
    pub async fn initialize(config: &Config) -> Result<Self> {
        let kv = Arc::new(MemoryKv::new());
        let store = Arc::new(MemoryCatalog::new());
        let mut state = Self::with_backends(config, store, kv.clone());
        state.memory_kv = Some(kv);

        if let Some(path) = &config.catalog_seed_path {
            seed::load_seed_file(&state.catalog, Path::new(path))
                .await
                .map_err(ServerError::Internal)?;
        }

        tracing::info!(
            environment = %config.environment,
            kv_timeout_ms = config.kv_timeout_ms,
            "Server state initialized"
        );
        Ok(state)
    }

    /// Start periodic maintenance
    pub fn start_background_tasks(&self) {
        if let Some(kv) = self.memory_kv.clone() {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(KV_SWEEP_INTERVAL);
                loop {
                    interval.tick().await;
                    let purged = kv.purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged, remaining = kv.len(), "Expired KV entries purged");
                    }
                }
            });
        }
    }

    /// Teardown after the listener has stopped
    pub async fn shutdown(&self) {
        let entries = self.memory_kv.as_ref().map(|kv| kv.len()).unwrap_or(0);
        tracing::info!(
            uptime_secs = self.uptime().as_secs(),
            kv_entries = entries,
            "Server state shut down"
        );
    }

    pub fn catalog(&self) -> &CachedCatalog {
        &self.catalog
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn configurations(&self) -> &ConfigurationManager {
        &self.configurations
    }

    pub fn orders(&self) -> &OrderFinalizer {
        &self.orders
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
