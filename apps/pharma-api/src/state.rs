//! Application state management

use database::ConnectionStatus;
use mongodb::{Client, Database};
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// May point at an unreachable server in degraded mode
    pub mongo_client: Client,
    pub db: Database,
    /// Liveness flag kept current by the monitor
    pub status: ConnectionStatus,
    pub started_at: Instant,
}

#[cfg(test)]
impl AppState {
    /// State whose client points at a closed port, flagged disconnected
    pub async fn degraded_for_tests(admin_api_enabled: bool) -> Self {
        use crate::config::{CatalogConfig, Config, Environment, MailConfig};
        use core_config::{app_info, server::ServerConfig};
        use database::mongodb::MongoConfig;
        use std::time::Duration;

        const UNREACHABLE: &str = "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=100";

        let mongo_client = Client::with_uri_str(UNREACHABLE).await.unwrap();
        let config = Config {
            app: app_info!(),
            mongodb: MongoConfig::new(UNREACHABLE),
            server: ServerConfig::default(),
            environment: Environment::Development,
            catalog: CatalogConfig {
                health_interval: Duration::from_secs(15),
            },
            mail: MailConfig {
                from: "noreply@pharma.example".into(),
                admin_email: "admin@pharma.example".into(),
            },
            admin_api_enabled,
        };

        Self {
            db: mongo_client.database(config.mongodb.database()),
            mongo_client,
            config,
            status: ConnectionStatus::disconnected(),
            started_at: Instant::now(),
        }
    }
}
