//! redb table definitions for the heat store.
//!
//! Keys are the full store key (`{prefix}{identifier}`); values are
//! JSON-serialized [`StoredEntry`](crate::redb_store::StoredEntry) envelopes.

use redb::TableDefinition;

/// Every stored value, keyed by its store key.
pub const ENTRIES: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");
