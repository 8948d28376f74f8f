//! Operational endpoints: health and Prometheus metrics.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use kv_store::KeyValueStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use super::orders::AppState;

/// Key read by the health probe; it never needs to exist.
const PROBE_KEY: &str = "health:probe";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
}

/// GET /health — reports whether the store answers a read.
pub async fn health<S: KeyValueStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.repository.store().get(PROBE_KEY).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                store: "up",
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "store health probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    store: "down",
                }),
            )
        }
    }
}

/// GET /metrics — Prometheus text exposition.
pub async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
