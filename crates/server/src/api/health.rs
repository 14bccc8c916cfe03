use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::schemas::{HealthResponse, MetricsResponse};

fn metrics_body(state: &AppState) -> MetricsResponse {
    let snap = state.broker.metrics().snapshot();
    MetricsResponse {
        submitted: snap.submitted,
        rejected: snap.rejected,
        store_failed: snap.store_failed,
        delivered: snap.delivered,
        active_sessions: state.broker.sessions().total_sessions(),
    }
}

/// `GET /health` -- returns service status together with a metrics snapshot.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Health check",
    description = "Returns service status and a snapshot of broker delivery metrics.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "ok".into(),
        metrics: metrics_body(&state),
    };
    (StatusCode::OK, Json(body))
}

/// `GET /metrics` -- returns broker metrics as JSON.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    summary = "Broker metrics",
    description = "Returns current delivery counters for monitoring.",
    responses(
        (status = 200, description = "Current metric counters", body = MetricsResponse)
    )
)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(metrics_body(&state)))
}
