//! HTTP API server exposing the order repository.
//!
//! A thin shell: every handler makes one repository call and maps the
//! result to a response. Structured logging via tracing, Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use domain::OrderRepository;
use kv_store::KeyValueStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: KeyValueStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health::<S>))
        .route(
            "/orders",
            get(routes::orders::list::<S>).post(routes::orders::create::<S>),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>)
                .put(routes::orders::update::<S>)
                .delete(routes::orders::delete::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around a store.
pub fn create_state<S: KeyValueStore + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        repository: OrderRepository::new(store),
    })
}
