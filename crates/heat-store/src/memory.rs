//! In-process key-value cache with per-entry TTL and LRU eviction.
//!
//! Each entry remembers the TTL it was written with. Expired entries are
//! dropped lazily when read, or in bulk via [`MemoryStore::purge_expired`].
//! When the cache is full, inserting a new key first drops expired
//! entries and only then evicts the least recently used live one.
//!
//! Cache statistics (hits, misses, evictions) are emitted as
//! `tracing::debug` events.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use heat_core::{KeyValueStore, StoreError, StoreResult};
use serde_json::Value;

/// Configuration for the memory store.
#[derive(Clone, Debug)]
pub struct MemoryStoreConfig {
    /// Maximum number of entries held at once (default: 10 000).
    pub max_entries: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
        }
    }
}

struct CacheEntry {
    value: Value,
    inserted_at: Instant,
    /// Zero means the entry never expires.
    ttl: Duration,
    last_accessed: Instant,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            inserted_at: now,
            ttl,
            last_accessed: now,
        }
    }

    fn is_expired(&self) -> bool {
        !self.ttl.is_zero() && self.inserted_at.elapsed() >= self.ttl
    }
}

#[derive(Default)]
struct CacheStats {
    hits: u64,
    misses: u64,
    evictions: u64,
}

struct Inner {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

/// Thread-safe expiring cache.
///
/// All state sits behind one `Mutex`; every operation is a short critical
/// section with no I/O.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    config: MemoryStoreConfig,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MemoryStoreConfig::default())
    }
}

impl MemoryStore {
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
            config,
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> StoreResult<usize> {
        let mut inner = self.lock()?;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired());
        let purged = before - inner.entries.len();
        if purged > 0 {
            tracing::debug!(purged, "memory store purged expired entries");
        }
        Ok(purged)
    }

    /// `(hits, misses, evictions)` since creation.
    pub fn stats(&self) -> StoreResult<(u64, u64, u64)> {
        let inner = self.lock()?;
        Ok((inner.stats.hits, inner.stats.misses, inner.stats.evictions))
    }

    /// Number of entries held, including expired ones not yet purged.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.lock()?.entries.is_empty())
    }

    fn evict_expired(inner: &mut Inner) {
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired());
        let evicted = before - inner.entries.len();
        if evicted > 0 {
            inner.stats.evictions += evicted as u64;
            tracing::debug!(
                evicted,
                cache_evictions = inner.stats.evictions,
                "memory store expired eviction"
            );
        }
    }

    fn evict_lru(inner: &mut Inner) {
        let lru_key = inner
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());

        if let Some(key) = lru_key {
            inner.entries.remove(&key);
            inner.stats.evictions += 1;
            tracing::debug!(
                evicted_key = %key,
                cache_evictions = inner.stats.evictions,
                "memory store LRU eviction"
            );
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let mut inner = self.lock()?;
        let inner = &mut *inner;

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                inner.stats.misses += 1;
                tracing::debug!(%key, cache_misses = inner.stats.misses, "memory store miss");
                return Ok(None);
            }
        };

        if expired {
            inner.entries.remove(key);
            inner.stats.misses += 1;
            tracing::debug!(%key, cache_misses = inner.stats.misses, "memory store miss (expired)");
            return Ok(None);
        }

        inner.stats.hits += 1;
        let hits = inner.stats.hits;
        let value = inner.entries.get_mut(key).map(|entry| {
            entry.last_accessed = Instant::now();
            entry.value.clone()
        });
        tracing::debug!(%key, cache_hits = hits, "memory store hit");
        Ok(value)
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) -> StoreResult<()> {
        let mut inner = self.lock()?;

        if !inner.entries.contains_key(key) && inner.entries.len() >= self.config.max_entries {
            Self::evict_expired(&mut inner);
            if inner.entries.len() >= self.config.max_entries {
                Self::evict_lru(&mut inner);
            }
        }

        inner
            .entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heat_core::HeatCounter;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    const HOUR: Duration = Duration::from_secs(3600);

    fn small_store(max_entries: usize) -> MemoryStore {
        MemoryStore::new(MemoryStoreConfig { max_entries })
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn new_store_is_empty() {
        let store = MemoryStore::default();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.len().unwrap(), 0);
        assert_eq!(store.stats().unwrap(), (0, 0, 0));
    }

    #[test]
    fn default_config_values() {
        assert_eq!(MemoryStoreConfig::default().max_entries, 10_000);
    }

    // ── Put and Get ──────────────────────────────────────────────────

    #[test]
    fn put_and_get() {
        let store = MemoryStore::default();
        store.put("k", json!({ "temperature": 20 }), HOUR).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!({ "temperature": 20 })));
    }

    #[test]
    fn get_missing_returns_none() {
        let store = MemoryStore::default();
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn put_replaces_existing_value() {
        let store = MemoryStore::default();
        store.put("k", json!(1), HOUR).unwrap();
        store.put("k", json!(2), HOUR).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(2)));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let store = MemoryStore::default();
        store.put("Key", json!(1), HOUR).unwrap();
        assert_eq!(store.get("key").unwrap(), None);
    }

    // ── TTL Expiration ───────────────────────────────────────────────

    #[test]
    fn entry_expires_after_ttl() {
        let store = MemoryStore::default();
        store.put("expiring", json!(1), Duration::from_millis(50)).unwrap();
        assert!(store.get("expiring").unwrap().is_some());

        thread::sleep(Duration::from_millis(80));

        assert!(store.get("expiring").unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn zero_ttl_never_expires() {
        let store = MemoryStore::default();
        store.put("forever", json!(1), Duration::ZERO).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert!(store.get("forever").unwrap().is_some());
    }

    #[test]
    fn ttl_is_per_entry() {
        let store = MemoryStore::default();
        store.put("short", json!(1), Duration::from_millis(50)).unwrap();
        store.put("long", json!(2), HOUR).unwrap();

        thread::sleep(Duration::from_millis(80));

        assert!(store.get("short").unwrap().is_none());
        assert!(store.get("long").unwrap().is_some());
    }

    #[test]
    fn rewrite_restarts_ttl() {
        let store = MemoryStore::default();
        store.put("k", json!(1), Duration::from_millis(100)).unwrap();
        thread::sleep(Duration::from_millis(60));
        store.put("k", json!(2), Duration::from_millis(100)).unwrap();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(store.get("k").unwrap(), Some(json!(2)));
    }

    #[test]
    fn purge_expired_removes_only_expired() {
        let store = MemoryStore::default();
        store.put("a", json!(1), Duration::from_millis(30)).unwrap();
        store.put("b", json!(2), Duration::from_millis(30)).unwrap();
        store.put("c", json!(3), HOUR).unwrap();

        thread::sleep(Duration::from_millis(60));

        assert_eq!(store.purge_expired().unwrap(), 2);
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.purge_expired().unwrap(), 0);
    }

    // ── LRU Eviction ─────────────────────────────────────────────────

    #[test]
    fn evicts_lru_when_at_capacity() {
        let store = small_store(3);

        store.put("a", json!(1), HOUR).unwrap();
        thread::sleep(Duration::from_millis(5));
        store.put("b", json!(2), HOUR).unwrap();
        thread::sleep(Duration::from_millis(5));
        store.put("c", json!(3), HOUR).unwrap();
        thread::sleep(Duration::from_millis(5));

        // Touch "a" so "b" becomes least recently used.
        store.get("a").unwrap();
        thread::sleep(Duration::from_millis(5));

        store.put("d", json!(4), HOUR).unwrap();
        assert_eq!(store.len().unwrap(), 3);
        assert!(store.get("a").unwrap().is_some());
        assert!(store.get("b").unwrap().is_none());
        assert!(store.get("c").unwrap().is_some());
        assert!(store.get("d").unwrap().is_some());
    }

    #[test]
    fn expired_entries_are_evicted_before_live_ones() {
        let store = small_store(2);

        store.put("heat_live", json!({ "temperature": 100 }), HOUR).unwrap();
        thread::sleep(Duration::from_millis(5));
        store.put("heat_dead", json!({ "temperature": 10 }), Duration::from_millis(10)).unwrap();
        thread::sleep(Duration::from_millis(30));

        store.put("heat_new", json!({ "temperature": 20 }), HOUR).unwrap();

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.get("heat_live").unwrap(), Some(json!({ "temperature": 100 })));
        assert!(store.get("heat_new").unwrap().is_some());
        assert!(store.get("heat_dead").unwrap().is_none());
        assert_eq!(store.stats().unwrap().2, 1);
    }

    #[test]
    fn no_eviction_when_replacing_existing_key() {
        let store = small_store(2);
        store.put("a", json!(1), HOUR).unwrap();
        store.put("b", json!(1), HOUR).unwrap();
        store.put("a", json!(2), HOUR).unwrap();

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.stats().unwrap().2, 0);
    }

    #[test]
    fn never_exceeds_max_entries() {
        let store = small_store(5);
        for i in 0..20 {
            store.put(&format!("k-{i}"), json!(i), HOUR).unwrap();
            assert!(store.len().unwrap() <= 5);
        }
        assert_eq!(store.stats().unwrap().2, 15);
    }

    // ── Statistics ───────────────────────────────────────────────────

    #[test]
    fn stats_track_hits_and_misses() {
        let store = MemoryStore::default();
        store.put("cached", json!(1), HOUR).unwrap();

        store.get("cached").unwrap();
        store.get("cached").unwrap();
        store.get("absent").unwrap();

        let (hits, misses, _) = store.stats().unwrap();
        assert_eq!(hits, 2);
        assert_eq!(misses, 1);
    }

    // ── With counters ────────────────────────────────────────────────

    #[test]
    fn counter_round_trip() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
        let mut a = HeatCounter::new("127.0.0.1", store.clone()).unwrap();
        a.increase(20).write().unwrap();

        let b = HeatCounter::new("127.0.0.1", store).unwrap();
        assert_eq!(b.temperature(), 20);
    }

    #[test]
    fn expired_heat_starts_cold() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
        let mut a = HeatCounter::new("127.0.0.1", store.clone()).unwrap();
        a.set_ttl(Duration::from_millis(50))
            .increase_to_maximum()
            .write()
            .unwrap();

        thread::sleep(Duration::from_millis(80));

        let b = HeatCounter::new("127.0.0.1", store).unwrap();
        assert_eq!(b.temperature(), 0);
    }

    #[test]
    fn bare_scalar_entry_starts_cold() {
        let store = Arc::new(MemoryStore::default());
        store.put("heat_127.0.0.1", json!(63), HOUR).unwrap();
        let h = HeatCounter::new("127.0.0.1", store).unwrap();
        assert_eq!(h.temperature(), 0);
    }
}
