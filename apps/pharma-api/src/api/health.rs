//! Service health, readiness and the API index

use axum::{Json, Router, extract::State, response::Response, routing::get};
use axum_helpers::{
    RouteDirectory,
    server::{HealthCheckFuture, run_health_checks},
};
use chrono::{DateTime, Utc};
use database::mongodb::ping;
use observability::{CatalogMetrics, metrics_handler};
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceHealth {
    success: bool,
    message: &'static str,
    timestamp: DateTime<Utc>,
    environment: &'static str,
    database: DatabaseHealth,
    server: ServerHealth,
}

#[derive(Debug, Serialize)]
struct DatabaseHealth {
    connected: bool,
    status: &'static str,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerHealth {
    port: u16,
    uptime_seconds: u64,
}

/// `GET /api/health` and `GET /api`, nested under `/api`
pub fn router(state: AppState, directory: RouteDirectory) -> Router {
    let version = state.config.app.version;

    Router::new()
        .route("/health", get(service_health))
        .with_state(state)
        .route("/", get(move || api_index(directory.clone(), version)))
}

/// Top-level `GET /ready` and `GET /metrics`
pub fn probes(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Always 200; reports the liveness flag rather than probing.
async fn service_health(State(state): State<AppState>) -> Json<ServiceHealth> {
    let connected = state.status.is_connected();
    CatalogMetrics::set_database_connected(connected);

    Json(ServiceHealth {
        success: true,
        message: "Pharma Distributor API is running",
        timestamp: Utc::now(),
        environment: state.config.environment.as_str(),
        database: DatabaseHealth {
            connected,
            status: state.status.describe(),
            name: state.config.mongodb.database().to_string(),
        },
        server: ServerHealth {
            port: state.config.server.port,
            uptime_seconds: state.started_at.elapsed().as_secs(),
        },
    })
}

async fn api_index(directory: RouteDirectory, version: &'static str) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Welcome to the Pharma Distributor API",
        "version": version,
        "endpoints": directory,
    }))
}

/// 503 while MongoDB does not answer a ping
async fn readiness(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "database",
        Box::pin(async { ping(&state.mongo_client).await.map_err(|e| e.to_string()) }),
    )];
    run_health_checks(checks).await
}
