//! Ready-made handlers.

use axum::Json;
use heat_core::HeatState;
use serde::Serialize;

use crate::RequestHeat;

/// Snapshot of the caller's heat.
#[derive(Debug, Serialize)]
pub struct HeatStatus {
    pub identifier: String,
    pub temperature: i64,
    pub state: HeatState,
}

/// GET handler reporting the calling client's own heat. Read-only.
pub async fn heat_status(heat: RequestHeat) -> Json<HeatStatus> {
    let counter = heat.lock().await;
    Json(HeatStatus {
        identifier: counter.identifier().to_string(),
        temperature: counter.temperature(),
        state: counter.state(),
    })
}
