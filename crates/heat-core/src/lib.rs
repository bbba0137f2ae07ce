//! heat-core — bounded "heat" counters for tracking suspicious identifiers.
//!
//! A [`HeatCounter`] holds an integer temperature for one identifier (a
//! client IP, an account name, ...). Callers raise it when the identifier
//! misbehaves and lower it when it behaves, then classify the result as
//! [`HeatState::Safe`], [`HeatState::Warning`] or [`HeatState::Critical`].
//!
//! Temperatures live in an external [`KeyValueStore`] between uses. The
//! counter reads the stored value once on construction and writes it back
//! only when [`HeatCounter::write`] is called. Decay is the store's TTL:
//! once an entry expires the next counter starts cold at zero.

pub mod config;
pub mod counter;
pub mod error;
pub mod state;
pub mod store;

pub use config::HeatConfig;
pub use counter::HeatCounter;
pub use error::{StoreError, StoreResult};
pub use state::HeatState;
pub use store::{HeatRecord, KeyValueStore};
