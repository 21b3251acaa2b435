use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("Article not found")]
    ArticleNotFound,

    #[error("Invalid value '{value}' for {option}")]
    InvalidOption { option: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(String),
}

pub type NewsResult<T> = Result<T, NewsError>;

impl From<NewsError> for AppError {
    fn from(err: NewsError) -> Self {
        match err {
            NewsError::ArticleNotFound => AppError::NotFound(err.to_string()),
            NewsError::InvalidOption { .. } => AppError::BadRequest(err.to_string()),
            NewsError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for NewsError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for NewsError {
    fn from(err: mongodb::error::Error) -> Self {
        NewsError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (NewsError::ArticleNotFound, StatusCode::NOT_FOUND),
            (
                NewsError::InvalidOption {
                    option: "category",
                    value: "gossip".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                NewsError::Database("socket closed".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
