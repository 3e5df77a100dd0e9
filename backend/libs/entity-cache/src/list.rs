//! Listing snapshot synchronization
//!
//! One snapshot lives under one key, shared by every filter, page and order a
//! caller may ask for. A hit can therefore return items that do not match the
//! caller's query. Reads through the store replace the snapshot wholesale;
//! writes patch it item by item while it exists.
//!
//! Reconciliation is a read-modify-write over a store without compare-and-swap.
//! Under [`WriteDiscipline::Unguarded`] two concurrent reconciliations that read
//! the same snapshot race and the later write discards the earlier edit. The
//! store of record is unaffected; only the cached copy loses data until the
//! next populate or TTL expiry. [`WriteDiscipline::SingleWriter`] holds a
//! per-key lock across the whole sequence.

use crate::{
    read_json, ttl, write_json, CacheMetrics, CacheResult, CacheStore, CachedEntity, KeyLocks,
};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// How snapshot writers are ordered against each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteDiscipline {
    /// No ordering; concurrent reconciliations may lose cache-side edits
    Unguarded,
    /// One writer per key at a time within this process
    #[default]
    SingleWriter,
}

impl FromStr for WriteDiscipline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unguarded" => Ok(Self::Unguarded),
            "single-writer" | "single_writer" => Ok(Self::SingleWriter),
            other => Err(format!("unknown list cache write discipline: {other}")),
        }
    }
}

impl fmt::Display for WriteDiscipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unguarded => f.write_str("unguarded"),
            Self::SingleWriter => f.write_str("single-writer"),
        }
    }
}

/// Outcome of a write reconciliation against the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// No snapshot was cached; nothing to do
    NoSnapshot,
    /// Snapshot left as it was
    Unchanged,
    /// Matching entry merged and snapshot re-persisted
    Patched,
    /// Snapshot re-persisted after removing any matching entry
    Rewritten,
}

impl Reconciled {
    fn as_str(&self) -> &'static str {
        match self {
            Self::NoSnapshot => "no_snapshot",
            Self::Unchanged => "unchanged",
            Self::Patched => "patched",
            Self::Rewritten => "rewritten",
        }
    }
}

/// Synchronizer for a single listing snapshot
pub struct ListCacheSync<T> {
    store: Arc<dyn CacheStore>,
    key: String,
    ttl_secs: u64,
    discipline: WriteDiscipline,
    locks: Arc<KeyLocks>,
    metrics: CacheMetrics,
    _entity: PhantomData<fn() -> T>,
}

impl<T: CachedEntity> ListCacheSync<T> {
    pub fn new(store: Arc<dyn CacheStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            ttl_secs: ttl::LIST,
            discipline: WriteDiscipline::default(),
            locks: KeyLocks::global(),
            metrics: CacheMetrics::new(),
            _entity: PhantomData,
        }
    }

    pub fn with_discipline(mut self, discipline: WriteDiscipline) -> Self {
        self.discipline = discipline;
        self
    }

    pub fn with_locks(mut self, locks: Arc<KeyLocks>) -> Self {
        self.locks = locks;
        self
    }

    /// Current snapshot, `None` on miss
    pub async fn read(&self) -> Option<Vec<T>> {
        read_json(self.store.as_ref(), &self.key, &self.metrics).await
    }

    /// Replace the snapshot with `items` and start a fresh TTL
    pub async fn populate(&self, items: &[T]) -> CacheResult<()> {
        let _guard = self.write_guard().await;
        write_json(
            self.store.as_ref(),
            &self.key,
            items,
            self.ttl_secs,
            &self.metrics,
        )
        .await?;
        debug!(key = %self.key, count = items.len(), "List snapshot populated");
        Ok(())
    }

    /// A created entity is not appended; the store alone reflects it until
    /// the next populate.
    pub fn reconcile_create(&self, entity: &T) -> Reconciled {
        debug!(
            key = %self.key,
            id = entity.entity_id(),
            "Create leaves list snapshot unchanged"
        );
        self.metrics
            .record_reconciliation(&self.key, Reconciled::Unchanged.as_str());
        Reconciled::Unchanged
    }

    /// Merge `patch` into the cached copy of `id`, if both exist
    pub async fn reconcile_update(&self, id: i64, patch: &T::Patch) -> CacheResult<Reconciled> {
        let _guard = self.write_guard().await;

        let outcome = match self.read().await {
            None => Reconciled::NoSnapshot,
            Some(mut items) => match items.iter_mut().find(|item| item.entity_id() == id) {
                None => Reconciled::Unchanged,
                Some(item) => {
                    item.apply_patch(patch);
                    self.persist(&items).await?;
                    Reconciled::Patched
                }
            },
        };

        debug!(key = %self.key, id, outcome = outcome.as_str(), "List snapshot update reconciled");
        self.metrics
            .record_reconciliation(&self.key, outcome.as_str());
        Ok(outcome)
    }

    /// Drop `id` from the snapshot and re-persist it, if a snapshot exists
    pub async fn reconcile_delete(&self, id: i64) -> CacheResult<Reconciled> {
        let _guard = self.write_guard().await;

        let outcome = match self.read().await {
            None => Reconciled::NoSnapshot,
            Some(mut items) => {
                items.retain(|item| item.entity_id() != id);
                self.persist(&items).await?;
                Reconciled::Rewritten
            }
        };

        debug!(key = %self.key, id, outcome = outcome.as_str(), "List snapshot delete reconciled");
        self.metrics
            .record_reconciliation(&self.key, outcome.as_str());
        Ok(outcome)
    }

    async fn persist(&self, items: &[T]) -> CacheResult<()> {
        write_json(
            self.store.as_ref(),
            &self.key,
            items,
            self.ttl_secs,
            &self.metrics,
        )
        .await
    }

    async fn write_guard(&self) -> Option<OwnedMutexGuard<()>> {
        match self.discipline {
            WriteDiscipline::Unguarded => None,
            WriteDiscipline::SingleWriter => Some(self.locks.acquire(&self.key).await),
        }
    }
}
