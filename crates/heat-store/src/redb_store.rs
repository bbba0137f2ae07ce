//! RedbStore — persistent expiring key-value store backed by redb.
//!
//! Every value is wrapped in a [`StoredEntry`] envelope carrying its
//! absolute expiry time (unix milliseconds) and JSON-serialized into redb's
//! `&[u8]` value column. Expired entries are never returned by `get`; they
//! stay on disk until overwritten, removed, or swept by
//! [`RedbStore::purge_expired`].

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use heat_core::{KeyValueStore, StoreError, StoreResult};
use redb::{Database, ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::tables::ENTRIES;

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// On-disk envelope around a stored value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredEntry {
    pub value: Value,
    /// Unix time in milliseconds after which the entry is gone.
    /// `None` for entries written with a zero TTL.
    pub expires_at_ms: Option<u64>,
}

impl StoredEntry {
    fn new(value: Value, ttl: Duration, now_ms: u64) -> Self {
        // Sub-millisecond TTLs round up so a fresh entry is never born expired.
        let expires_at_ms = (!ttl.is_zero()).then(|| {
            let ttl_ms = ttl.as_millis().clamp(1, u64::MAX as u128) as u64;
            now_ms.saturating_add(ttl_ms)
        });
        Self {
            value,
            expires_at_ms,
        }
    }

    fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms.is_some_and(|at| now_ms >= at)
    }
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Thread-safe expiring store backed by redb.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "heat store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory heat store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(ENTRIES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn read_entry(&self, key: &str) -> StoreResult<Option<StoredEntry>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ENTRIES).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let entry: StoredEntry =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// Delete a key. Returns true if it existed (expired or not).
    pub fn remove(&self, key: &str) -> StoreResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(ENTRIES).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, existed, "heat entry removed");
        Ok(existed)
    }

    /// List live (unexpired) entries whose key starts with `prefix`.
    ///
    /// Envelopes that fail to parse are skipped.
    pub fn entries_with_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Value)>> {
        let now = unix_now_ms();
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ENTRIES).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        // Keys are ordered, so every match sits in one run starting at `prefix`.
        for entry in table.range(prefix..).map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            let stored: StoredEntry = match serde_json::from_slice(value.value()) {
                Ok(stored) => stored,
                Err(e) => {
                    debug!(%key, error = %e, "skipping unreadable heat entry");
                    continue;
                }
            };
            if !stored.is_expired(now) {
                results.push((key.to_string(), stored.value));
            }
        }
        Ok(results)
    }

    /// Delete every expired entry. Returns the number deleted.
    pub fn purge_expired(&self) -> StoreResult<u32> {
        let now = unix_now_ms();
        // Collect keys in a read transaction first.
        let keys: Vec<String> = {
            let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
            let table = txn.open_table(ENTRIES).map_err(map_err!(Table))?;
            let mut keys = Vec::new();
            for entry in table.iter().map_err(map_err!(Read))? {
                let (key, value) = entry.map_err(map_err!(Read))?;
                // Envelopes that no longer parse are dead weight too.
                let expired = serde_json::from_slice::<StoredEntry>(value.value())
                    .map(|stored| stored.is_expired(now))
                    .unwrap_or(true);
                if expired {
                    keys.push(key.value().to_string());
                }
            }
            keys
        };

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let count = keys.len() as u32;
        {
            let mut table = txn.open_table(ENTRIES).map_err(map_err!(Table))?;
            for key in &keys {
                table.remove(key.as_str()).map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(count, "expired heat entries purged");
        Ok(count)
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        match self.read_entry(key)? {
            Some(entry) if entry.is_expired(unix_now_ms()) => {
                debug!(%key, "heat entry expired");
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) -> StoreResult<()> {
        let entry = StoredEntry::new(value, ttl, unix_now_ms());
        let bytes = serde_json::to_vec(&entry).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(ENTRIES).map_err(map_err!(Table))?;
            table
                .insert(key, bytes.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, expires_at_ms = ?entry.expires_at_ms, "heat entry stored");
        Ok(())
    }
}
