//! HeatCounter — bounded temperature for a single identifier.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::HeatConfig;
use crate::error::StoreResult;
use crate::state::HeatState;
use crate::store::{HeatRecord, KeyValueStore};

/// Temperature tracker for one identifier, synced with a [`KeyValueStore`].
///
/// Construction loads whatever the store holds under
/// `storage_prefix + identifier`. Mutators only touch memory; nothing is
/// persisted until [`write`](Self::write) is called.
///
/// Bounds are applied at mutation time only. Changing `max_temperature` or
/// `min_temperature` later, or loading an out-of-range stored value, leaves
/// the current temperature where it is.
pub struct HeatCounter {
    identifier: String,
    store: Arc<dyn KeyValueStore>,
    storage_prefix: String,
    temperature: i64,
    max_temperature: i64,
    min_temperature: i64,
    safe_threshold: f64,
    ttl: Duration,
}

impl HeatCounter {
    /// Create a counter with default settings and load its stored temperature.
    pub fn new(
        identifier: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
    ) -> StoreResult<Self> {
        Self::with_config(identifier, store, &HeatConfig::default())
    }

    /// Create a counter from `config` and load its stored temperature.
    ///
    /// The load uses the configured prefix. Store failures are returned
    /// as-is; malformed stored values start the counter at zero.
    pub fn with_config(
        identifier: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        config: &HeatConfig,
    ) -> StoreResult<Self> {
        let mut counter = Self::from_record(identifier, store, config, HeatRecord::default());
        counter.load()?;
        Ok(counter)
    }

    /// Create a counter from a record already read from `store`, without
    /// touching the store again.
    pub fn from_record(
        identifier: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        config: &HeatConfig,
        record: HeatRecord,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            store,
            storage_prefix: config.storage_prefix.clone(),
            temperature: record.temperature,
            max_temperature: config.max_temperature,
            min_temperature: config.min_temperature,
            safe_threshold: config.safe_threshold,
            ttl: config.ttl(),
        }
    }

    fn load(&mut self) -> StoreResult<()> {
        let key = self.storage_key();
        match self.store.get(&key)?.map(HeatRecord::decode) {
            Some(Some(record)) => {
                self.temperature = record.temperature;
                debug!(%key, temperature = record.temperature, "heat loaded");
            }
            Some(None) => {
                debug!(%key, "malformed heat record, starting cold");
            }
            None => {
                debug!(%key, "no stored heat, starting cold");
            }
        }
        Ok(())
    }

    /// Persist the current temperature under `storage_prefix + identifier`.
    pub fn write(&mut self) -> StoreResult<&mut Self> {
        let key = self.storage_key();
        let record = HeatRecord {
            temperature: self.temperature,
        };
        self.store.put(&key, record.to_value(), self.ttl)?;
        debug!(%key, temperature = self.temperature, ttl_secs = self.ttl.as_secs(), "heat written");
        Ok(self)
    }

    /// The store key this counter reads from and writes to.
    pub fn storage_key(&self) -> String {
        format!("{}{}", self.storage_prefix, self.identifier)
    }

    // ── Temperature ────────────────────────────────────────────────

    /// Raise the temperature by `amount`, capped at `max_temperature`.
    ///
    /// `amount` is not sign-checked; a negative amount lowers the
    /// temperature with no floor applied.
    pub fn increase(&mut self, amount: i64) -> &mut Self {
        self.temperature = self
            .temperature
            .saturating_add(amount)
            .min(self.max_temperature);
        self
    }

    pub fn increase_to_maximum(&mut self) -> &mut Self {
        self.temperature = self.max_temperature;
        self
    }

    /// Lower the temperature by `amount`, floored at `min_temperature`.
    pub fn decrease(&mut self, amount: i64) -> &mut Self {
        self.temperature = self
            .temperature
            .saturating_sub(amount)
            .max(self.min_temperature);
        self
    }

    pub fn decrease_to_minimum(&mut self) -> &mut Self {
        self.temperature = self.min_temperature;
        self
    }

    pub fn temperature(&self) -> i64 {
        self.temperature
    }

    // ── Classification ─────────────────────────────────────────────

    fn safe_boundary(&self) -> f64 {
        self.max_temperature as f64 * self.safe_threshold
    }

    /// Below `max_temperature * safe_threshold`.
    pub fn is_safe(&self) -> bool {
        (self.temperature as f64) < self.safe_boundary()
    }

    /// At or above the safe boundary, but not pinned at the maximum.
    pub fn is_warning(&self) -> bool {
        self.temperature != self.max_temperature
            && (self.temperature as f64) >= self.safe_boundary()
    }

    /// Exactly at `max_temperature`. One below is never critical.
    pub fn is_critical(&self) -> bool {
        self.temperature == self.max_temperature
    }

    pub fn state(&self) -> HeatState {
        if self.is_critical() {
            HeatState::Critical
        } else if self.is_warning() {
            HeatState::Warning
        } else {
            HeatState::Safe
        }
    }

    // ── Getters and setters ────────────────────────────────────────

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Point the counter at another identifier. Stored state is not moved.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) -> &mut Self {
        self.identifier = identifier.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn set_store(&mut self, store: Arc<dyn KeyValueStore>) -> &mut Self {
        self.store = store;
        self
    }

    pub fn storage_prefix(&self) -> &str {
        &self.storage_prefix
    }

    pub fn set_storage_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.storage_prefix = prefix.into();
        self
    }

    pub fn max_temperature(&self) -> i64 {
        self.max_temperature
    }

    pub fn set_max_temperature(&mut self, max: i64) -> &mut Self {
        self.max_temperature = max;
        self
    }

    pub fn min_temperature(&self) -> i64 {
        self.min_temperature
    }

    pub fn set_min_temperature(&mut self, min: i64) -> &mut Self {
        self.min_temperature = min;
        self
    }

    pub fn safe_threshold(&self) -> f64 {
        self.safe_threshold
    }

    pub fn set_safe_threshold(&mut self, threshold: f64) -> &mut Self {
        self.safe_threshold = threshold;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn set_ttl(&mut self, ttl: Duration) -> &mut Self {
        self.ttl = ttl;
        self
    }
}

impl fmt::Debug for HeatCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeatCounter")
            .field("identifier", &self.identifier)
            .field("storage_prefix", &self.storage_prefix)
            .field("temperature", &self.temperature)
            .field("max_temperature", &self.max_temperature)
            .field("min_temperature", &self.min_temperature)
            .field("safe_threshold", &self.safe_threshold)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
