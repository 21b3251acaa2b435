//! MongoDB connection management

mod codec;
mod config;
mod connector;
mod health;
mod liveness;

pub use codec::{to_stored_bson, uuid_to_bson};
pub use config::MongoConfig;
pub use connector::{build_client, connect_from_config, connect_from_config_with_retry};
pub use health::{HealthStatus, check_health, check_health_detailed, ping};
pub use liveness::{
    LivenessMonitor, Transition, record_probe, spawn_liveness_monitor, spawn_liveness_monitor_with,
};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
