//! heat-store — [`KeyValueStore`](heat_core::KeyValueStore) implementations.
//!
//! - [`MemoryStore`]: process-local cache with per-entry TTL and LRU
//!   eviction. The default backing for request tracking.
//! - [`RedbStore`]: persistent store backed by [redb](https://docs.rs/redb),
//!   with an expiry timestamp stamped into every entry. Also available
//!   in-memory for tests.
//!
//! Both are `Send + Sync` and can be shared behind an `Arc` across tasks.

pub mod memory;
pub mod redb_store;
pub mod tables;

pub use memory::{MemoryStore, MemoryStoreConfig};
pub use redb_store::RedbStore;
