//! Pharma Distributor API - catalogue, inquiries and news over REST

use axum::middleware;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::ConnectionStatus;
use database::mongodb::{build_client, connect_from_config_with_retry, spawn_liveness_monitor_with};
use mongodb::Client;
use observability::{init_metrics, metrics_middleware};
use std::time::{Duration, Instant};
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    init_metrics().map_err(|e| eyre::eyre!("Failed to install metrics recorder: {}", e))?;

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());
    let (mongo_client, status) = connect(&config).await?;
    let db = mongo_client.database(config.mongodb.database());

    let state = AppState {
        config,
        mongo_client,
        db,
        status,
        started_at: Instant::now(),
    };

    if state.status.is_connected() {
        api::init_indexes(&state).await?;
    } else {
        warn!("Skipping index creation while MongoDB is unreachable");
    }

    let restore_state = state.clone();
    let monitor = spawn_liveness_monitor_with(
        state.mongo_client.clone(),
        state.status.clone(),
        state.config.catalog.health_interval,
        move || api::restore_indexes(restore_state.clone()),
    );

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes, api::directory()).await?;

    let app = router
        .merge(health_router(state.config.app))
        .merge(api::health::probes(state.clone()))
        .layer(middleware::from_fn(metrics_middleware));

    info!(
        database_connected = state.status.is_connected(),
        admin_api = state.config.admin_api_enabled,
        "Starting Pharma Distributor API"
    );

    let mongo_client = state.mongo_client.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: stopping liveness monitor");
            monitor.stop().await;
            drop(mongo_client);
            info!("MongoDB connection closed");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Pharma Distributor API shutdown complete");
    Ok(())
}

/// Connect with retry. Development tolerates an unreachable server and starts
/// disconnected; the liveness monitor picks the connection up later.
async fn connect(config: &Config) -> eyre::Result<(Client, ConnectionStatus)> {
    match connect_from_config_with_retry(&config.mongodb, None).await {
        Ok(client) => Ok((client, ConnectionStatus::connected())),
        Err(e) if config.environment.is_development() => {
            warn!(error = %e, "MongoDB unavailable, serving the fallback dataset");
            let client = build_client(&config.mongodb).await?;
            Ok((client, ConnectionStatus::disconnected()))
        }
        Err(e) => Err(e.into()),
    }
}
