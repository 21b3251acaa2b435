//! Per-client request quota.
//!
//! Each client IP gets `RATE_LIMIT_MAX` requests (default 100) that refill
//! evenly over `RATE_LIMIT_WINDOW_SECS` (default 900). Requests over the
//! quota get 429 with the standard error envelope.

use crate::errors::{AppError, ErrorCode};
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use core_config::env_parse_or;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::io;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

pub const RATE_LIMIT_MAX_VAR: &str = "RATE_LIMIT_MAX";
pub const RATE_LIMIT_WINDOW_VAR: &str = "RATE_LIMIT_WINDOW_SECS";

const DEFAULT_MAX_REQUESTS: NonZeroU32 = NonZeroU32::MIN.saturating_add(99);
const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: NonZeroU32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

impl RateLimitConfig {
    /// # Errors
    /// Fails when either variable is set but is not a positive integer.
    pub fn from_env() -> io::Result<Self> {
        let invalid = |e: core_config::ConfigError| io::Error::new(io::ErrorKind::InvalidInput, e.to_string());

        let max_requests = env_parse_or(RATE_LIMIT_MAX_VAR, DEFAULT_MAX_REQUESTS).map_err(invalid)?;
        let window_secs = env_parse_or(RATE_LIMIT_WINDOW_VAR, DEFAULT_WINDOW.as_secs()).map_err(invalid)?;
        if window_secs == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} must be at least 1", RATE_LIMIT_WINDOW_VAR),
            ));
        }

        Ok(Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    fn quota(&self) -> Quota {
        let period = self.window / self.max_requests.get();
        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(self.max_requests))
            .allow_burst(self.max_requests)
    }
}

/// Shared keyed limiter, one bucket per client IP
#[derive(Clone)]
pub struct IpRateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl IpRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::keyed(config.quota())),
        }
    }

    /// Take one request from `client`'s quota. False when it is spent.
    pub fn check(&self, client: &str) -> bool {
        self.limiter.check_key(&client.to_string()).is_ok()
    }
}

/// First `x-forwarded-for` hop, then `x-real-ip`, then the peer address.
pub fn client_ip(request: &Request) -> Option<String> {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| header("x-real-ip"))
        .map(str::to_string)
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
}

/// Middleware rejecting clients over their quota with 429.
///
/// ```ignore
/// let limiter = IpRateLimiter::new(&RateLimitConfig::default());
/// let apis = apis.layer(middleware::from_fn_with_state(limiter, rate_limit));
/// ```
pub async fn rate_limit(State(limiter): State<IpRateLimiter>, request: Request, next: Next) -> Response {
    let client = client_ip(&request).unwrap_or_else(|| "unknown".to_string());

    if limiter.check(&client) {
        return next.run(request).await;
    }

    tracing::warn!(client = %client, path = %request.uri().path(), "Rate limit exceeded");
    AppError::TooManyRequests(ErrorCode::TooManyRequests.default_message().to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder().uri("/api/products");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_quota_is_spent_per_client() {
        let limiter = IpRateLimiter::new(&RateLimitConfig {
            max_requests: NonZeroU32::new(3).unwrap(),
            window: Duration::from_secs(60),
        });

        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1"));
        }
        assert!(!limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.2"));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_hop() {
        let forwarded = request(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1"), ("x-real-ip", "10.0.0.9")]);
        assert_eq!(client_ip(&forwarded).as_deref(), Some("203.0.113.7"));

        let real_ip = request(&[("x-real-ip", "10.0.0.9")]);
        assert_eq!(client_ip(&real_ip).as_deref(), Some("10.0.0.9"));

        let mut peer = request(&[]);
        peer.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 4], 51000))));
        assert_eq!(client_ip(&peer).as_deref(), Some("192.0.2.4"));

        assert_eq!(client_ip(&request(&[])), None);
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars_unset([RATE_LIMIT_MAX_VAR, RATE_LIMIT_WINDOW_VAR], || {
            assert_eq!(RateLimitConfig::from_env().unwrap(), RateLimitConfig::default());
        });

        temp_env::with_vars(
            [(RATE_LIMIT_MAX_VAR, Some("20")), (RATE_LIMIT_WINDOW_VAR, Some("60"))],
            || {
                let config = RateLimitConfig::from_env().unwrap();
                assert_eq!(config.max_requests.get(), 20);
                assert_eq!(config.window, Duration::from_secs(60));
            },
        );

        temp_env::with_var(RATE_LIMIT_MAX_VAR, Some("0"), || {
            assert!(RateLimitConfig::from_env().is_err());
        });
        temp_env::with_var(RATE_LIMIT_WINDOW_VAR, Some("0"), || {
            assert!(RateLimitConfig::from_env().is_err());
        });
    }
}
