use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ErrorCode, ErrorResponse};

/// Named entry points advertised to clients that hit an unknown path.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RouteDirectory(Arc<BTreeMap<String, String>>);

impl RouteDirectory {
    pub fn new<I, K, V>(routes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(Arc::new(
            routes
                .into_iter()
                .map(|(name, path)| (name.into(), path.into()))
                .collect(),
        ))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteNotFound<'a> {
    #[serde(flatten)]
    error: ErrorResponse,
    available_routes: &'a RouteDirectory,
}

/// 404 body for unmatched paths, listing the available entry points.
pub fn route_not_found(uri: &Uri, directory: &RouteDirectory) -> Response {
    let body = RouteNotFound {
        error: ErrorResponse::new(ErrorCode::RouteNotFound, format!("Route {} not found", uri)),
        available_routes: directory,
    };

    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Handler for 404 Not Found errors without a route directory.
pub async fn not_found() -> Response {
    let body = ErrorResponse::new(ErrorCode::NotFound, "The requested resource was not found");
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_route_not_found_lists_directory() {
        let directory = RouteDirectory::new([("products", "/api/products"), ("health", "/api/health")]);
        let uri: Uri = "/api/unknown?x=1".parse().unwrap();

        let response = route_not_found(&uri, &directory);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Route /api/unknown?x=1 not found");
        assert_eq!(json["availableRoutes"]["products"], "/api/products");
        assert_eq!(json["error"], "ROUTE_NOT_FOUND");
    }

    #[test]
    fn test_directory_lookup() {
        let directory = RouteDirectory::new([("news", "/api/news")]);
        assert_eq!(directory.get("news"), Some("/api/news"));
        assert_eq!(directory.len(), 1);
        assert!(RouteDirectory::default().is_empty());
    }
}
