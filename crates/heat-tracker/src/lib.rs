//! heat-tracker — per-request heat tracking for axum services.
//!
//! Installs one [`HeatCounter`] per inbound request, keyed by the peer IP
//! address, and writes it back exactly once after the inner service has
//! produced its response. Handlers reach the counter through the
//! [`RequestHeat`] extractor and raise or lower it as they see fit.
//!
//! ```rust,ignore
//! use axum::{Router, middleware, routing::post};
//! use heat_tracker::{HeatTracker, RequestHeat, track_heat};
//!
//! async fn login(heat: RequestHeat) -> &'static str {
//!     heat.lock().await.increase(20);
//!     "bad password"
//! }
//!
//! let tracker = HeatTracker::in_memory(Default::default());
//! let app = Router::new()
//!     .route("/login", post(login))
//!     .layer(middleware::from_fn_with_state(tracker, track_heat));
//!
//! // Serve with `into_make_service_with_connect_info::<SocketAddr>()`
//! // so the middleware can see the peer address.
//! ```

pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use heat_core::{HeatConfig, HeatCounter, KeyValueStore, StoreResult};
use heat_store::MemoryStore;

pub use handlers::heat_status;
pub use middleware::{RequestHeat, track_heat};

/// Shared state for the tracking middleware: one store, one config.
#[derive(Clone)]
pub struct HeatTracker {
    store: Arc<dyn KeyValueStore>,
    config: Arc<HeatConfig>,
}

impl HeatTracker {
    pub fn new(store: Arc<dyn KeyValueStore>, config: HeatConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Track heat in a fresh process-local [`MemoryStore`].
    pub fn in_memory(config: HeatConfig) -> Self {
        Self::new(Arc::new(MemoryStore::default()), config)
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn config(&self) -> &HeatConfig {
        &self.config
    }

    /// Build and load the counter for `identifier`.
    pub fn counter_for(&self, identifier: &str) -> StoreResult<HeatCounter> {
        HeatCounter::with_config(identifier, self.store.clone(), &self.config)
    }
}

impl Default for HeatTracker {
    fn default() -> Self {
        Self::in_memory(HeatConfig::default())
    }
}
