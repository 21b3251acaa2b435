//! Inquiries Domain
//!
//! Contact form submissions and quote requests. Both are plain writes to
//! MongoDB with no degraded mode.
//!
//! ```rust,no_run
//! use domain_inquiries::{ContactService, LogMailer, MongoInquiryRepository, QuoteService, handlers};
//! use mongodb::Client;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let repository = MongoInquiryRepository::new(&client.database("pharma_distributor"));
//!
//! let mailer = Arc::new(LogMailer::new("noreply@pharma.example"));
//! let contacts = Arc::new(ContactService::new(repository.clone(), mailer, "admin@pharma.example"));
//! let quotes = Arc::new(QuoteService::new(repository));
//!
//! let router = handlers::router(contacts, quotes);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod mailer;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{InquiryError, InquiryResult};
pub use handlers::ApiDoc;
pub use mailer::{LogMailer, MailError, MailMessage, Mailer};
pub use memory::InMemoryInquiryRepository;
pub use models::{Contact, ContactSubmission, Quote, QuoteRequest};
pub use mongodb::MongoInquiryRepository;
pub use repository::{ContactRepository, QuoteRepository};
pub use service::{ContactService, QuoteService};
