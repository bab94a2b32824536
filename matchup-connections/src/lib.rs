pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use matchup_shared::clients::rabbitmq::RabbitMQClient;
use matchup_shared::middleware::metrics_middleware;

use config::AppConfig;
use services::ConnectionsService;

pub struct AppState {
    pub service: ConnectionsService,
    pub config: AppConfig,
    pub rabbitmq: Option<RabbitMQClient>,
    pub metrics_handle: Option<PrometheusHandle>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/discover", get(routes::discover::discover_feed))
        .route("/profiles/:profile_id/like", post(routes::interests::like_profile))
        .route("/profiles/:profile_id/pass", post(routes::interests::pass_profile))
        .route("/profiles/:profile_id/dislike", post(routes::interests::pass_profile))
        .route("/likes", get(routes::likes::liked_profiles))
        .route("/matches", get(routes::matches::list_matches))
        .route("/matches/:match_id", axum::routing::delete(routes::matches::unmatch))
        .route(
            "/preferences",
            get(routes::preferences::get_preferences).put(routes::preferences::put_preferences),
        )
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Describes the domain counters. Call after the recorder is installed.
pub fn describe_metrics() {
    metrics::describe_counter!("matchup_interests_recorded_total", "Like and pass signals written");
    metrics::describe_counter!("matchup_matches_created_total", "Matches created from reciprocal likes");
}
