//! In-memory module cache
//!
//! Holds module table query results keyed by capability tag. The cache is
//! passed explicitly into the resolver; results are identical with or
//! without it, only the number of table queries changes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

use crate::model::ModuleRecord;
use crate::model::config::CacheConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Capability-keyed cache of module records with TTL expiry
#[derive(Clone)]
pub struct ModuleCache {
    cache: Cache<String, Arc<Vec<ModuleRecord>>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl ModuleCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            cache,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Build from configuration; a zero TTL disables caching
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        if config.module_ttl_seconds == 0 {
            tracing::info!("Module cache disabled");
            return None;
        }

        tracing::info!(
            ttl_seconds = config.module_ttl_seconds,
            max_capacity = config.max_capacity,
            "Module cache enabled"
        );
        Some(Self::new(
            Duration::from_secs(config.module_ttl_seconds),
            config.max_capacity,
        ))
    }

    pub async fn get(&self, capability: &str) -> Option<Arc<Vec<ModuleRecord>>> {
        match self.cache.get(capability).await {
            Some(modules) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(modules)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store the modules for a capability; last writer wins
    pub async fn insert(&self, capability: &str, modules: Vec<ModuleRecord>) {
        self.cache
            .insert(capability.to_string(), Arc::new(modules))
            .await;
    }

    pub async fn invalidate(&self, capability: &str) {
        self.cache.invalidate(capability).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
