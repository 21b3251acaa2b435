//! Catalog Domain
//!
//! Product browsing and search for the distributor storefront, with a
//! bundled fallback dataset that keeps reads working while MongoDB is down.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, source-tagged envelopes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Filter Builder, search strategies, Reconciler
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Source    │  ← store when available, fallback dataset otherwise
//! │  Selector   │
//! └──┬───────┬──┘
//!    │       │
//! ┌──▼──┐ ┌──▼──────┐
//! │Mongo│ │In-memory│  ← both implement CatalogRepository
//! └─────┘ └─────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use database::ConnectionStatus;
//! use domain_catalog::{CatalogService, MongoCatalogRepository, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("pharma_distributor");
//!
//! let status = ConnectionStatus::connected();
//! let repository = MongoCatalogRepository::new(&db, status);
//! let service = CatalogService::new(repository);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fallback;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod reconcile;
pub mod repository;
pub mod search;
pub mod service;
pub mod source;

pub use error::{CatalogError, CatalogResult};
pub use fallback::InMemoryCatalogRepository;
pub use filter::{PageInfo, Pagination, ProductFilter, ProductQuery, SortOrder};
pub use handlers::{ApiDoc, SourcedResponse};
pub use models::{CatalogProduct, Category, Manufacturer, Product, Review};
pub use mongodb::MongoCatalogRepository;
pub use reconcile::{Reconciled, reconcile};
pub use repository::CatalogRepository;
pub use search::SearchTerm;
pub use service::CatalogService;
pub use source::{DataSource, FallbackPolicy, SourceSelector, Sourced};
