//! In-memory implementation of the inquiry repositories

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::InquiryResult;
use crate::models::{Contact, ContactFilter, ContactStatus, Pagination, Quote};
use crate::repository::{ContactRepository, QuoteRepository};

#[derive(Debug, Default)]
struct Inquiries {
    contacts: Vec<Contact>,
    quotes: Vec<Quote>,
    sequences: HashMap<String, u32>,
}

/// Contacts and quotes held in process memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInquiryRepository {
    data: Arc<RwLock<Inquiries>>,
}

impl InMemoryInquiryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contacts(&self) -> Vec<Contact> {
        self.data.read().await.contacts.clone()
    }

    pub async fn quotes(&self) -> Vec<Quote> {
        self.data.read().await.quotes.clone()
    }
}

#[async_trait]
impl ContactRepository for InMemoryInquiryRepository {
    async fn insert_contact(&self, contact: &Contact) -> InquiryResult<()> {
        self.data.write().await.contacts.push(contact.clone());
        Ok(())
    }

    async fn list_contacts(
        &self,
        filter: &ContactFilter,
        pagination: Pagination,
    ) -> InquiryResult<(Vec<Contact>, u64)> {
        let data = self.data.read().await;

        let mut matching: Vec<&Contact> =
            data.contacts.iter().filter(|c| filter.matches(c)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(pagination.skip() as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn count_by_status(&self) -> InquiryResult<Vec<(ContactStatus, u64)>> {
        let data = self.data.read().await;
        let mut counts: HashMap<ContactStatus, u64> = HashMap::new();
        for contact in &data.contacts {
            *counts.entry(contact.status).or_default() += 1;
        }
        let mut counts: Vec<(ContactStatus, u64)> = counts.into_iter().collect();
        counts.sort();
        Ok(counts)
    }
}

#[async_trait]
impl QuoteRepository for InMemoryInquiryRepository {
    async fn next_quote_sequence(&self, period: &str) -> InquiryResult<u32> {
        let mut data = self.data.write().await;
        let sequence = data.sequences.entry(period.to_string()).or_default();
        *sequence += 1;
        Ok(*sequence)
    }

    async fn insert_quote(&self, quote: &Quote) -> InquiryResult<()> {
        self.data.write().await.quotes.push(quote.clone());
        Ok(())
    }
}
