use crate::errors::handlers::{RouteDirectory, route_not_found};
use crate::http::{IpRateLimiter, RateLimitConfig, cors_from_env, rate_limit, security_headers};
use super::shutdown::{ShutdownCoordinator, shutdown_signal};
use axum::{Router, http::Uri, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Serve `router` until SIGINT/SIGTERM.
///
/// # Errors
/// Fails if the listener cannot bind or the server errors while running.
pub async fn create_app(router: Router, server_config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    Ok(())
}

/// Wrap API routes with documentation and cross-cutting middleware.
///
/// Sets up:
/// - OpenAPI UIs (Swagger UI, ReDoc, RapiDoc, Scalar) for `T`
/// - `apis` nested under `/api`, rate limited per client IP
/// - tracing, security headers, CORS from `CORS_ALLOWED_ORIGIN`, compression
/// - a 404 fallback that lists `directory`
///
/// Domain routers apply their own state before they get here. Health and
/// metrics endpoints are merged by the app.
///
/// # Errors
/// Fails when `CORS_ALLOWED_ORIGIN` is missing, empty or invalid, or when
/// the rate limit variables do not parse.
///
/// # Example
/// ```ignore
/// use axum_helpers::{RouteDirectory, server::create_router};
///
/// let api_routes = Router::new()
///     .nest("/products", domain_catalog::handlers::products_router(service));
///
/// let directory = RouteDirectory::new([("products", "/api/products")]);
/// let router = create_router::<ApiDoc>(api_routes, directory).await?;
/// ```
pub async fn create_router<T>(apis: Router, directory: RouteDirectory) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    Ok(build_router::<T>(
        apis,
        directory,
        cors_from_env()?,
        RateLimitConfig::from_env()?,
    ))
}

/// [`create_router`] with explicit CORS and rate limit settings.
pub fn build_router<T>(
    apis: Router,
    directory: RouteDirectory,
    cors_layer: CorsLayer,
    limits: RateLimitConfig,
) -> Router
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let limiter = IpRateLimiter::new(&limits);
    let apis = apis.layer(middleware::from_fn_with_state(limiter, rate_limit));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(move |uri: Uri| {
            let directory = directory.clone();
            async move { route_not_found(&uri, &directory) }
        })
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new())
}

/// Serve with coordinated shutdown and a bounded cleanup phase.
///
/// After the shutdown signal, in-flight requests drain and `cleanup` runs
/// for at most `shutdown_timeout`.
///
/// # Example
/// ```ignore
/// let cleanup = async move {
///     monitor.stop().await;
/// };
///
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, _rx) = ShutdownCoordinator::new();
    let shutdown_handle = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        shutdown_handle.wait_for_signal().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(_) => info!("Cleanup completed successfully"),
            Err(_) => {
                tracing::warn!(
                    "Cleanup exceeded timeout of {:?}, forcing shutdown",
                    shutdown_timeout
                );
            }
        }
    });

    let mut shutdown_rx = coordinator.subscribe();
    let serve_result = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    cleanup_handle.await.ok();

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{HeaderValue, Request, StatusCode}, routing::get};
    use crate::http::create_cors_layer;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[derive(OpenApi)]
    #[openapi(info(title = "test"))]
    struct TestDoc;

    async fn router() -> Router {
        let apis = Router::new().route("/ping", get(|| async { "pong" }));
        let directory = RouteDirectory::new([("ping", "/api/ping")]);
        let cors = create_cors_layer(vec![HeaderValue::from_static("http://localhost:5173")]);

        build_router::<TestDoc>(apis, directory, cors, RateLimitConfig::default())
    }

    fn ping_from(ip: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/ping")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_routes_are_nested_under_api() {
        let response = router()
            .await
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_lists_directory() {
        let response = router()
            .await
            .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Route /api/nope not found");
        assert_eq!(json["availableRoutes"]["ping"], "/api/ping");
    }

    #[tokio::test]
    async fn test_client_over_quota_gets_429() {
        let app = router().await;

        for _ in 0..100 {
            let response = app.clone().oneshot(ping_from("203.0.113.7")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.clone().oneshot(ping_from("203.0.113.7")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "TOO_MANY_REQUESTS");
        assert_eq!(
            json["message"],
            "Too many requests from this IP, please try again later."
        );

        let other = app.clone().oneshot(ping_from("198.51.100.2")).await.unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_docs_are_not_rate_limited() {
        let limits = RateLimitConfig {
            max_requests: std::num::NonZeroU32::MIN,
            window: Duration::from_secs(60),
        };
        let apis = Router::new().route("/ping", get(|| async { "pong" }));
        let cors = create_cors_layer(vec![HeaderValue::from_static("http://localhost:5173")]);
        let app = build_router::<TestDoc>(apis, RouteDirectory::new([("ping", "/api/ping")]), cors, limits);

        for _ in 0..3 {
            let request = Request::builder()
                .uri("/api-docs/openapi.json")
                .header("x-forwarded-for", "203.0.113.7")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
