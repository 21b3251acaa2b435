//! HTTP middleware: CORS, security headers and per-client rate limiting.
//!
//! ```ignore
//! use axum_helpers::http::{cors_from_env, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(cors_from_env()?);
//! ```

pub mod cors;
pub mod rate_limit;
pub mod security;

pub use cors::{CORS_ORIGIN_VAR, cors_from_env, create_cors_layer, parse_origins};
pub use rate_limit::{IpRateLimiter, RateLimitConfig, client_ip, rate_limit};
pub use security::security_headers;
