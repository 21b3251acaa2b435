//! API routes module

pub mod health;

use axum::Router;
use axum_helpers::RouteDirectory;
use domain_catalog::{CatalogService, MongoCatalogRepository};
use domain_inquiries::{ContactService, LogMailer, MongoInquiryRepository, QuoteService};
use domain_news::{MongoNewsRepository, NewsService};
use std::sync::Arc;

use crate::state::AppState;

/// Entry points listed by `GET /api` and by the 404 fallback
pub fn directory() -> RouteDirectory {
    RouteDirectory::new([
        ("products", "/api/products"),
        ("catalog", "/api/catalog"),
        ("categories", "/api/categories"),
        ("manufacturers", "/api/manufacturers"),
        ("contact", "/api/contact"),
        ("quotes", "/api/quotes"),
        ("news", "/api/news"),
        ("health", "/api/health"),
    ])
}

/// Create all API routes. Nested under `/api` by `axum_helpers::create_router`.
pub fn routes(state: &AppState) -> Router {
    let catalog = CatalogService::new(MongoCatalogRepository::new(&state.db, state.status.clone()));

    let inquiries = MongoInquiryRepository::new(&state.db);
    let mailer = Arc::new(LogMailer::new(state.config.mail.from.clone()));
    let contacts = Arc::new(ContactService::new(
        inquiries.clone(),
        mailer,
        state.config.mail.admin_email.clone(),
    ));
    let quotes = Arc::new(QuoteService::new(inquiries));

    let news = NewsService::new(MongoNewsRepository::new(&state.db));

    let mut router = Router::new()
        .merge(domain_catalog::handlers::router(catalog))
        .merge(domain_inquiries::handlers::router(Arc::clone(&contacts), quotes))
        .merge(domain_news::handlers::router(news))
        .merge(health::router(state.clone(), directory()));

    if state.config.admin_api_enabled {
        router = router.merge(domain_inquiries::handlers::admin_router(contacts));
    }
    router
}

/// Create indexes for every collection the API queries
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoCatalogRepository::new(&state.db, state.status.clone())
        .init_indexes()
        .await?;
    MongoInquiryRepository::new(&state.db).init_indexes().await?;
    MongoNewsRepository::new(&state.db).init_indexes().await?;
    Ok(())
}

/// Index creation after the connection returns from a degraded start.
/// Failures are logged and retried on the next restore.
pub async fn restore_indexes(state: AppState) {
    match init_indexes(&state).await {
        Ok(()) => tracing::info!("Indexes created after MongoDB reconnected"),
        Err(e) => tracing::warn!(error = %e, "Index creation failed after reconnect"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_degraded_search_serves_fallback_dataset() {
        let app = routes(&AppState::degraded_for_tests(false).await);

        let (status, body) = get(app, "/catalog/search?q=paracetamol").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dataSource"], "mock");
        assert_eq!(body["databaseConnected"], false);
    }

    #[tokio::test]
    async fn test_admin_listing_is_not_mounted_by_default() {
        let app = routes(&AppState::degraded_for_tests(false).await);

        let (status, _) = get(app, "/contact").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_admin_listing_mounted_when_enabled() {
        let app = routes(&AppState::degraded_for_tests(true).await);

        // Inquiries have no fallback, so the unreachable store surfaces as 500
        let (status, body) = get(app, "/contact").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_restore_indexes_tolerates_unreachable_store() {
        let state = AppState::degraded_for_tests(false).await;

        assert!(init_indexes(&state).await.is_err());
        restore_indexes(state.clone()).await;
        assert!(!state.status.is_connected());
    }

    #[test]
    fn test_directory_lists_public_entry_points() {
        let directory = directory();

        assert_eq!(directory.get("products"), Some("/api/products"));
        assert_eq!(directory.get("news"), Some("/api/news"));
        assert_eq!(directory.len(), 8);
    }
}
