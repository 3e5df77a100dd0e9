//! Per-entity point entries
//!
//! Each entry is keyed independently by id or by a natural key. Writing or
//! invalidating one entry never touches another entry or the listing snapshot.

use crate::{read_json, ttl, write_json, CacheKey, CacheMetrics, CacheResult, CacheStore};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Synchronizer for point entries within one key namespace
pub struct PointCacheSync<T> {
    store: Arc<dyn CacheStore>,
    namespace: &'static str,
    ttl_secs: u64,
    metrics: CacheMetrics,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned + Send + Sync> PointCacheSync<T> {
    pub fn new(store: Arc<dyn CacheStore>, namespace: &'static str) -> Self {
        Self {
            store,
            namespace,
            ttl_secs: ttl::POINT,
            metrics: CacheMetrics::new(),
            _entity: PhantomData,
        }
    }

    /// Full cache key for `id` in this namespace
    pub fn key(&self, id: impl Display) -> String {
        CacheKey::point(self.namespace, id)
    }

    /// Cached copy, `None` on miss
    pub async fn read(&self, id: impl Display) -> Option<T> {
        let key = self.key(id);
        read_json(self.store.as_ref(), &key, &self.metrics).await
    }

    /// Store a copy read through from the store, with a fresh TTL
    pub async fn populate(&self, id: impl Display, entity: &T) -> CacheResult<()> {
        let key = self.key(id);
        write_json(
            self.store.as_ref(),
            &key,
            entity,
            self.ttl_secs,
            &self.metrics,
        )
        .await
    }

    /// Overwrite the entry after a write committed to the store
    pub async fn replace(&self, id: impl Display, entity: &T) -> CacheResult<()> {
        debug!(namespace = self.namespace, "Point entry replaced after write");
        self.populate(id, entity).await
    }

    /// Drop the entry after a write committed to the store
    pub async fn invalidate(&self, id: impl Display) -> CacheResult<()> {
        let key = self.key(id);
        if let Err(e) = self.store.del(&key).await {
            warn!(key = %key, error = %e, "Cache invalidation failed");
            self.metrics.record_error(&key, "invalidate");
            return Err(e);
        }

        debug!(key = %key, "Cache delete");
        self.metrics.record_invalidation(&key);
        Ok(())
    }
}
