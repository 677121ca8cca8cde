//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health — participant-local liveness.
///
/// Always succeeds while the process accepts requests; deliberately
/// independent of coordinator reachability (this reports participant
/// health, not transaction health).
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: participant::HealthStatus::Serving.as_str(),
    })
}
