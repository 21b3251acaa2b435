//! # Axum Helpers
//!
//! Shared HTTP plumbing for the API services.
//!
//! - **[`server`]**: router factory with OpenAPI UIs, health endpoints, graceful shutdown
//! - **[`http`]**: CORS and security header middleware
//! - **[`errors`]**: [`AppError`] and the `{success: false, ...}` error envelope
//! - **[`response`]**: the `{success: true, data}` envelope
//! - **[`extractors`]**: UUID path, validated JSON, forwarded user identity
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::{RouteDirectory, server::{create_app, create_router}};
//! use core_config::server::ServerConfig;
//!
//! let api_routes = Router::new(); // add domain routers
//! let directory = RouteDirectory::new([("health", "/api/health")]);
//! let router = create_router::<ApiDoc>(api_routes, directory).await?;
//!
//! create_app(router, &ServerConfig::default()).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod response;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, build_router, create_app,
    create_production_app, create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_from_env, create_cors_layer, security_headers};

pub use errors::handlers::RouteDirectory;
pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use response::ApiResponse;

pub use extractors::{UserIdentity, UuidPath, ValidatedJson};
