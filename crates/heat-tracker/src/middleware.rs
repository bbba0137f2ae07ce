//! Request-lifecycle hook: load heat before the handler, write it after.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use heat_core::HeatCounter;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, warn};

use crate::HeatTracker;

/// The current request's counter, shared between middleware and handlers.
///
/// Inserted into request extensions by [`track_heat`]; extract it in a
/// handler by naming it as an argument.
#[derive(Clone)]
pub struct RequestHeat(Arc<Mutex<HeatCounter>>);

impl RequestHeat {
    pub fn new(counter: HeatCounter) -> Self {
        Self(Arc::new(Mutex::new(counter)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, HeatCounter> {
        self.0.lock().await
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestHeat {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestHeat>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "heat tracking middleware is not installed",
        ))
    }
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": msg,
        })),
    )
        .into_response()
}

/// axum middleware: one counter per request, keyed by peer IP.
///
/// If the store cannot be read the request is refused with
/// `503 Service Unavailable` and the inner service is not called. If the
/// final write fails the update is lost; the inner response is returned
/// unchanged.
pub async fn track_heat(
    State(tracker): State<HeatTracker>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    mut request: Request,
    next: Next,
) -> Response {
    let identifier = peer.ip().to_string();

    let counter = match tracker.counter_for(&identifier) {
        Ok(counter) => counter,
        Err(e) => {
            warn!(%identifier, error = %e, "heat store read failed");
            return error_response("heat store unavailable", StatusCode::SERVICE_UNAVAILABLE);
        }
    };
    debug!(%identifier, temperature = counter.temperature(), "heat attached to request");

    let heat = RequestHeat::new(counter);
    request.extensions_mut().insert(heat.clone());

    let response = next.run(request).await;

    let mut counter = heat.lock().await;
    if let Err(e) = counter.write() {
        error!(%identifier, error = %e, "heat store write failed, update lost");
    }
    response
}
