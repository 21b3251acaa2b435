//! Custom extractors for Axum handlers.
//!
//! Every rejection renders through [`crate::AppError`], so clients see one
//! error envelope whatever the extractor.

pub mod user_identity;
pub mod uuid_path;
pub mod validated_json;

pub use user_identity::{USER_ID_HEADER, UserIdentity};
pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
