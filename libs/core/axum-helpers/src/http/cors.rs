use axum::http::{HeaderName, HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::extractors::USER_ID_HEADER;

/// Comma-separated list of allowed browser origins.
pub const CORS_ORIGIN_VAR: &str = "CORS_ALLOWED_ORIGIN";

/// Parse a comma-separated origin list. Blank entries are skipped.
pub fn parse_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid {} value: {}", CORS_ORIGIN_VAR, e),
            )
        })?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} cannot be empty", CORS_ORIGIN_VAR),
        ));
    }

    Ok(origins)
}

/// CORS layer for the storefront origins.
///
/// Methods GET, POST, OPTIONS; headers Content-Type, Authorization, Accept
/// and the forwarded user id; credentials allowed; 1 hour max age.
pub fn create_cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Build the CORS layer from [`CORS_ORIGIN_VAR`], which must be set.
///
/// Examples:
/// - Development: `CORS_ALLOWED_ORIGIN=http://localhost:5173,http://localhost:3000`
/// - Production: `CORS_ALLOWED_ORIGIN=https://pharma.example.com`
pub fn cors_from_env() -> io::Result<CorsLayer> {
    let raw = std::env::var(CORS_ORIGIN_VAR).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{} environment variable is required. Example: {}=http://localhost:5173",
                CORS_ORIGIN_VAR, CORS_ORIGIN_VAR
            ),
        )
    })?;

    let origins = parse_origins(&raw)?;
    tracing::info!("CORS configured with allowed origins: {}", raw);
    Ok(create_cors_layer(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_blanks() {
        let origins = parse_origins("http://localhost:5173, ,https://pharma.example.com").unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://pharma.example.com");
    }

    #[test]
    fn test_parse_origins_rejects_empty_list() {
        assert!(parse_origins(" , ").is_err());
    }

    #[test]
    fn test_cors_from_env_requires_variable() {
        temp_env::with_var_unset(CORS_ORIGIN_VAR, || {
            let err = cors_from_env().unwrap_err();
            assert!(err.to_string().contains(CORS_ORIGIN_VAR));
        });
    }

    #[test]
    fn test_cors_from_env_accepts_list() {
        temp_env::with_var(CORS_ORIGIN_VAR, Some("http://localhost:5173"), || {
            assert!(cors_from_env().is_ok());
        });
    }
}
