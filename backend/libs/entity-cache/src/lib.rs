//! Entity cache synchronization layer
//!
//! Keeps cached copies of relationally-stored entities consistent with the
//! store they were read from:
//! - `ListCacheSync`: one shared listing snapshot, patched in place on writes
//! - `PointCacheSync`: independently keyed per-entity entries
//! - `CacheStore`: the key-value backend seam (Redis, or in-memory for tests)
//! - Versioned key schema and Prometheus metrics
//!
//! The two synchronizers never coordinate. A point entry and the listing
//! snapshot may hold different copies of the same entity until one of them
//! is rewritten or expires.

mod error;
mod keys;
mod lock;
mod metrics;

pub mod list;
pub mod memory;
pub mod point;
pub mod redis_store;

pub use error::{CacheError, CacheResult};
pub use keys::{CacheKey, CACHE_VERSION};
pub use list::{ListCacheSync, Reconciled, WriteDiscipline};
pub use lock::KeyLocks;
pub use memory::MemoryStore;
pub use metrics::CacheMetrics;
pub use point::PointCacheSync;
pub use redis_store::{RedisStore, SharedRedis};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// Default TTL values (seconds)
pub mod ttl {
    pub const LIST: u64 = 3600; // 1 hour
    pub const POINT: u64 = 3600; // 1 hour
}

/// Key-value backend operations
///
/// Values are opaque strings. There is no compare-and-swap and no
/// multi-key transaction.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a raw value, `None` when absent or expired
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a raw value with a fresh TTL
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    /// Delete a key
    async fn del(&self, key: &str) -> CacheResult<()>;
}

/// An entity that can live inside a listing snapshot
pub trait CachedEntity: Serialize + DeserializeOwned + Send + Sync {
    /// Field changes carried by an update
    type Patch: Send + Sync;

    fn entity_id(&self) -> i64;

    /// Merge patch fields over this cached copy
    fn apply_patch(&mut self, patch: &Self::Patch);
}

/// Read and decode a JSON value.
///
/// Backend failures and undecodable values both degrade to a miss; the
/// caller falls through to the store either way.
pub(crate) async fn read_json<T: DeserializeOwned>(
    store: &dyn CacheStore,
    key: &str,
    metrics: &CacheMetrics,
) -> Option<T> {
    match store.get(key).await {
        Ok(Some(data)) => match serde_json::from_str::<T>(&data) {
            Ok(value) => {
                debug!(key = %key, "Cache hit");
                metrics.record_hit(key);
                Some(value)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache deserialization failed");
                metrics.record_error(key, "deserialize");
                None
            }
        },
        Ok(None) => {
            debug!(key = %key, "Cache miss");
            metrics.record_miss(key);
            None
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Cache read failed, treating as miss");
            metrics.record_error(key, "read");
            None
        }
    }
}

/// Encode and persist a JSON value. Failures propagate.
pub(crate) async fn write_json<T: Serialize + ?Sized>(
    store: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl_secs: u64,
    metrics: &CacheMetrics,
) -> CacheResult<()> {
    let data = serde_json::to_string(value)?;
    if let Err(e) = store.set_ex(key, &data, ttl_secs).await {
        warn!(key = %key, error = %e, "Cache write failed");
        metrics.record_error(key, "write");
        return Err(e);
    }

    debug!(key = %key, ttl = ttl_secs, "Cache set");
    metrics.record_write(key);
    Ok(())
}
