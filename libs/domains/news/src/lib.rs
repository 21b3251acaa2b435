//! News Domain
//!
//! Read side of company news: the published listing and the article view,
//! which counts each read.

pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{NewsError, NewsResult};
pub use handlers::ApiDoc;
pub use memory::InMemoryNewsRepository;
pub use models::{Article, NewsCategory, NewsStatus, NewsSummary};
pub use mongodb::MongoNewsRepository;
pub use repository::NewsRepository;
pub use service::NewsService;
