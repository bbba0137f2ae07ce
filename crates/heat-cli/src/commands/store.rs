use std::sync::Arc;

use heat_core::{HeatConfig, HeatCounter, HeatRecord};
use heat_store::RedbStore;

use super::heat::HeatReport;

/// Every live counter stored under the configured prefix, sorted by key.
///
/// Entries that do not hold a heat record are skipped.
pub fn list(store: &RedbStore, config: &HeatConfig) -> anyhow::Result<Vec<HeatReport>> {
    let prefix = &config.storage_prefix;
    let mut reports = Vec::new();

    let shared: Arc<RedbStore> = Arc::new(store.clone());

    for (key, value) in store.entries_with_prefix(prefix)? {
        let Some(record) = HeatRecord::decode(value) else {
            tracing::debug!(%key, "skipping non-heat entry");
            continue;
        };
        let identifier = &key[prefix.len()..];
        let counter = HeatCounter::from_record(identifier, shared.clone(), config, record);
        reports.push(HeatReport::from_counter(&counter));
    }

    reports.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(reports)
}

pub fn purge(store: &RedbStore) -> anyhow::Result<u32> {
    let purged = store.purge_expired()?;
    tracing::info!(purged, "expired heat purged");
    Ok(purged)
}
