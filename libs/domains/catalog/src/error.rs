use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Search query is required")]
    MissingSearchQuery,

    #[error("Invalid value '{value}' for {option}")]
    InvalidOption { option: &'static str, value: String },

    #[error("Product not found")]
    ProductNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Manufacturer not found")]
    ManufacturerNotFound,

    #[error("No products found for salt: {0}")]
    SaltNotFound(String),

    #[error("Manufacturer not found: {0}")]
    ManufacturerNameNotFound(String),

    #[error("You have already reviewed this product")]
    DuplicateReview,

    #[error("Product was modified concurrently, please retry")]
    ConcurrentModification,

    #[error("Database is not connected")]
    StoreUnavailable,

    #[error("Database error: {0}")]
    Database(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn invalid_option(option: &'static str, value: impl Into<String>) -> Self {
        CatalogError::InvalidOption {
            option,
            value: value.into(),
        }
    }

    /// Failures of the store itself, as opposed to answers it gave.
    ///
    /// Only these send a read to the fallback dataset.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, CatalogError::Database(_) | CatalogError::StoreUnavailable)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MissingSearchQuery
            | CatalogError::InvalidOption { .. }
            | CatalogError::DuplicateReview => AppError::BadRequest(err.to_string()),
            CatalogError::ProductNotFound
            | CatalogError::CategoryNotFound
            | CatalogError::ManufacturerNotFound
            | CatalogError::SaltNotFound(_)
            | CatalogError::ManufacturerNameNotFound(_) => AppError::NotFound(err.to_string()),
            CatalogError::ConcurrentModification => AppError::Conflict(err.to_string()),
            CatalogError::StoreUnavailable => AppError::ServiceUnavailable(err.to_string()),
            CatalogError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for CatalogError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for CatalogError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_per_variant() {
        let cases = [
            (CatalogError::MissingSearchQuery, StatusCode::BAD_REQUEST),
            (CatalogError::invalid_option("stockStatus", "plenty"), StatusCode::BAD_REQUEST),
            (CatalogError::DuplicateReview, StatusCode::BAD_REQUEST),
            (CatalogError::ProductNotFound, StatusCode::NOT_FOUND),
            (CatalogError::SaltNotFound("x".into()), StatusCode::NOT_FOUND),
            (CatalogError::ConcurrentModification, StatusCode::CONFLICT),
            (CatalogError::StoreUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (CatalogError::Database("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_only_store_errors_trigger_fallback() {
        assert!(CatalogError::Database("timeout".into()).is_store_failure());
        assert!(CatalogError::StoreUnavailable.is_store_failure());
        assert!(!CatalogError::ProductNotFound.is_store_failure());
        assert!(!CatalogError::MissingSearchQuery.is_store_failure());
    }

    #[test]
    fn test_salt_message_names_the_salt() {
        assert_eq!(
            CatalogError::SaltNotFound("nonexistentdrug".into()).to_string(),
            "No products found for salt: nonexistentdrug"
        );
    }
}
