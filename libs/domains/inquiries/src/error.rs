use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InquiryError {
    #[error("Invalid value '{value}' for {option}")]
    InvalidOption { option: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(String),
}

pub type InquiryResult<T> = Result<T, InquiryError>;

impl InquiryError {
    pub fn invalid_option(option: &'static str, value: impl Into<String>) -> Self {
        InquiryError::InvalidOption {
            option,
            value: value.into(),
        }
    }
}

impl From<InquiryError> for AppError {
    fn from(err: InquiryError) -> Self {
        match err {
            InquiryError::InvalidOption { .. } => AppError::BadRequest(err.to_string()),
            InquiryError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for InquiryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for InquiryError {
    fn from(err: mongodb::error::Error) -> Self {
        InquiryError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for InquiryError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        InquiryError::Database(err.to_string())
    }
}
