//! Per-key write locks for snapshot read-modify-write sequences

use dashmap::DashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::{Mutex, OwnedMutexGuard};

static GLOBAL: OnceLock<Arc<KeyLocks>> = OnceLock::new();

/// Registry of async mutexes, one per cache key.
///
/// Serializes writers inside one process only. Writers in other processes
/// sharing the same Redis are not covered.
#[derive(Default)]
pub struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by every synchronizer built with defaults
    pub fn global() -> Arc<KeyLocks> {
        GLOBAL.get_or_init(|| Arc::new(KeyLocks::new())).clone()
    }

    /// Wait for exclusive ownership of `key`
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
