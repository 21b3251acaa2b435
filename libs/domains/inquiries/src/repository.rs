use async_trait::async_trait;

use crate::error::InquiryResult;
use crate::models::{Contact, ContactFilter, ContactStatus, Pagination, Quote};

/// Storage for contact submissions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn insert_contact(&self, contact: &Contact) -> InquiryResult<()>;

    /// One page of matching contacts, newest first, and the match count.
    async fn list_contacts(
        &self,
        filter: &ContactFilter,
        pagination: Pagination,
    ) -> InquiryResult<(Vec<Contact>, u64)>;

    /// Contacts per status across the whole collection.
    async fn count_by_status(&self) -> InquiryResult<Vec<(ContactStatus, u64)>>;
}

/// Storage for quote requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Atomically take the next sequence number for `period` (`yyyymm`).
    ///
    /// The first call for a period returns 1.
    async fn next_quote_sequence(&self, period: &str) -> InquiryResult<u32>;

    async fn insert_quote(&self, quote: &Quote) -> InquiryResult<()>;
}
