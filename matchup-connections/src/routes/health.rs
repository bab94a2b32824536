use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use matchup_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

/// Liveness plus Postgres and, when configured, RabbitMQ probes.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let mut checks = Vec::with_capacity(2);

    let service = state.service.clone();
    checks.push(match tokio::task::spawn_blocking(move || service.ping()).await {
        Ok(Ok(())) => HealthCheck::healthy("postgres"),
        Ok(Err(e)) => HealthCheck::failing("postgres", HealthStatus::Unhealthy, e.to_string()),
        Err(e) => HealthCheck::failing("postgres", HealthStatus::Unhealthy, e.to_string()),
    });

    if let Some(rabbitmq) = &state.rabbitmq {
        checks.push(if rabbitmq.is_connected() {
            HealthCheck::healthy("rabbitmq")
        } else {
            HealthCheck::failing("rabbitmq", HealthStatus::Degraded, "channel closed")
        });
    }

    let response = HealthResponse::from_checks("matchup-connections", env!("CARGO_PKG_VERSION"), checks);
    (response.http_status(), Json(response)).into_response()
}

/// Prometheus scrape endpoint. Empty when no recorder is installed.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
