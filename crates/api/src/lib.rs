//! HTTP service boundary for the payment participant.
//!
//! Exposes a direct charge, the saga-participant charge, liveness, and
//! Prometheus metrics, with structured logging via tracing.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use charge::ChargeProcessor;
use common::ClientId;
use metrics_exporter_prometheus::PrometheusHandle;
use participant::{CoordinatorTransport, InMemoryCoordinator, ParticipantClient};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::charge::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<T: CoordinatorTransport + 'static>(
    state: Arc<AppState<T>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/charge", post(routes::charge::direct::<T>))
        .route("/charge/txn", post(routes::charge::txn::<T>))
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

/// Creates application state around the given coordinator transport.
pub fn create_state<T: CoordinatorTransport>(transport: T, config: &Config) -> Arc<AppState<T>> {
    let participant =
        ParticipantClient::new(transport, ClientId::new(config.client_id.as_str()));
    Arc::new(AppState {
        processor: ChargeProcessor::default(),
        participant,
        compensation_uri: config.compensation_uri.clone(),
    })
}

/// Creates state backed by an in-memory coordinator, for tests and
/// local development. The coordinator is also returned so callers can
/// seed sessions and inject faults.
pub fn create_default_state(
    config: &Config,
) -> (Arc<AppState<InMemoryCoordinator>>, InMemoryCoordinator) {
    let coordinator = InMemoryCoordinator::new();
    let state = create_state(coordinator.clone(), config);
    (state, coordinator)
}
