//! Caller identity forwarded by the authentication gateway.

use crate::errors::AppError;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user id taken from [`USER_ID_HEADER`].
///
/// Token verification happens upstream; this extractor only requires the
/// header to be present and to hold a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserIdentity(pub Uuid);

impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(UserIdentity)
            .ok_or_else(|| {
                AppError::Unauthorized("Authentication required".to_string()).into_response()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    async fn extract(request: Request<()>) -> Result<UserIdentity, Response> {
        let (mut parts, _) = request.into_parts();
        UserIdentity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_reads_user_id_header() {
        let id = Uuid::now_v7();
        let request = Request::builder()
            .header(USER_ID_HEADER, id.to_string())
            .body(())
            .unwrap();

        assert_eq!(extract(request).await.unwrap(), UserIdentity(id));
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let response = extract(Request::builder().body(()).unwrap()).await.unwrap_err();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_header_is_unauthorized() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "admin")
            .body(())
            .unwrap();

        let response = extract(request).await.unwrap_err();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
