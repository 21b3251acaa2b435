//! Database connectors and connection-state utilities.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector, health checks, liveness monitor
//! - `config` - `core_config::FromEnv` support for [`mongodb::MongoConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::{ConnectionStatus, mongodb};
//!
//! let config = mongodb::MongoConfig::with_database("mongodb://localhost:27017", "pharma");
//! let client = mongodb::build_client(&config).await?;
//! let status = ConnectionStatus::new(mongodb::check_health(&client).await);
//! let monitor = mongodb::spawn_liveness_monitor(client.clone(), status.clone(), interval);
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{ConnectionStatus, DatabaseError, DatabaseResult};
