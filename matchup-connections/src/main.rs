use std::sync::Arc;

use matchup_connections::config::AppConfig;
use matchup_connections::services::ConnectionsService;
use matchup_connections::store::PgStore;
use matchup_connections::{app, AppState};
use matchup_shared::clients::db::create_pool;
use matchup_shared::clients::rabbitmq::RabbitMQClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    matchup_shared::middleware::init_tracing("matchup-connections");

    let config = AppConfig::load()?;
    let port = config.port;

    let pool = create_pool(&config.database_url, config.pool_size)?;
    let service = ConnectionsService::new(Arc::new(PgStore::new(pool)));

    let rabbitmq = match &config.rabbitmq_url {
        Some(url) => Some(RabbitMQClient::connect(url).await?),
        None => {
            tracing::warn!("rabbitmq_url not set, event publishing disabled");
            None
        }
    };

    let metrics_handle = matchup_shared::middleware::init_metrics("matchup-connections")?;
    matchup_connections::describe_metrics();

    let state = Arc::new(AppState {
        service,
        config,
        rabbitmq,
        metrics_handle: Some(metrics_handle),
    });

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "matchup-connections starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
