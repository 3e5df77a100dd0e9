//! Redis-backed `CacheStore`

use crate::{CacheError, CacheResult, CacheStore};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared Redis connection manager
pub type SharedRedis = Arc<Mutex<ConnectionManager>>;

/// Redis cache client
#[derive(Clone)]
pub struct RedisStore {
    redis: SharedRedis,
}

impl RedisStore {
    pub fn new(redis: SharedRedis) -> Self {
        Self { redis }
    }

    /// Round-trip a PING, used by readiness checks
    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.redis.lock().await;
        let pong: String = redis::cmd("PING").query_async(&mut *conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(CacheError::Unavailable(format!(
                "unexpected PING response: {pong}"
            )))
        }
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.redis.lock().await;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.redis.lock().await;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.redis.lock().await;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
