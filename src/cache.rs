//! Time-bounded cache for parsed analysis documents.
//!
//! Backed by `moka::sync::Cache`, which evicts expired entries on its own.

use std::hash::Hash;
use std::time::Duration;

use moka::sync::Cache;

/// Default TTL for cached documents.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Maximum cached documents per cache.
const MAX_ENTRIES: u64 = 256;

/// Key/value cache whose entries expire `ttl` after they were stored.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Cache<K, V>,
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();
        Self { ttl, entries }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key)
    }

    /// Stores `value`, restarting its TTL if the key was already present.
    pub fn set(&self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.invalidate(key);
    }

    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }

    /// Live entries, after flushing moka's pending evictions.
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}
