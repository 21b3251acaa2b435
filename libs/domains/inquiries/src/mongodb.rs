//! MongoDB implementation of the inquiry repositories

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, from_document},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{InquiryError, InquiryResult};
use crate::models::{Contact, ContactFilter, ContactStatus, Pagination, Quote};
use crate::repository::{ContactRepository, QuoteRepository};

#[derive(Debug, Deserialize)]
struct StatusCount {
    #[serde(rename = "_id")]
    status: ContactStatus,
    count: i64,
}

fn index(keys: Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().name(name.to_string()).build())
        .build()
}

fn contact_filter(filter: &ContactFilter) -> Document {
    let mut document = Document::new();
    if let Some(status) = filter.status {
        document.insert("status", status.to_string());
    }
    if let Some(priority) = filter.priority {
        document.insert("priority", priority.to_string());
    }
    if let Some(service) = filter.service {
        document.insert("service", service.to_string());
    }
    if let Some(search) = &filter.search {
        let pattern = doc! { "$regex": regex::escape(search), "$options": "i" };
        document.insert(
            "$or",
            vec![
                doc! { "name": pattern.clone() },
                doc! { "email": pattern.clone() },
                doc! { "subject": pattern.clone() },
                doc! { "message": pattern },
            ],
        );
    }
    document
}

/// MongoDB implementation of the contact and quote repositories
#[derive(Clone)]
pub struct MongoInquiryRepository {
    contacts: Collection<Contact>,
    quotes: Collection<Quote>,
    counters: Collection<Document>,
}

impl MongoInquiryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            contacts: db.collection::<Contact>("contacts"),
            quotes: db.collection::<Quote>("quotes"),
            counters: db.collection::<Document>("counters"),
        }
    }

    /// Initialize indexes for the admin listing and quote lookups
    pub async fn init_indexes(&self) -> InquiryResult<()> {
        self.contacts
            .create_indexes(vec![
                index(doc! { "email": 1 }, "idx_contact_email"),
                index(doc! { "status": 1 }, "idx_contact_status"),
                index(doc! { "priority": 1 }, "idx_contact_priority"),
                index(doc! { "createdAt": -1 }, "idx_contact_created"),
            ])
            .await?;

        let unique_number = IndexModel::builder()
            .keys(doc! { "quoteNumber": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_quote_number_unique".to_string())
                    .build(),
            )
            .build();
        self.quotes
            .create_indexes(vec![
                unique_number,
                index(doc! { "customerInfo.email": 1 }, "idx_quote_email"),
                index(doc! { "status": 1 }, "idx_quote_status"),
                index(doc! { "createdAt": -1 }, "idx_quote_created"),
            ])
            .await?;

        tracing::info!("Inquiry indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl ContactRepository for MongoInquiryRepository {
    #[instrument(skip(self, contact), fields(contact_id = %contact.id))]
    async fn insert_contact(&self, contact: &Contact) -> InquiryResult<()> {
        self.contacts.insert_one(contact).await?;
        tracing::info!("Contact stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_contacts(
        &self,
        filter: &ContactFilter,
        pagination: Pagination,
    ) -> InquiryResult<(Vec<Contact>, u64)> {
        let filter = contact_filter(filter);
        let total = self.contacts.count_documents(filter.clone()).await?;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .skip(pagination.skip())
            .limit(pagination.limit as i64)
            .build();
        let contacts: Vec<Contact> = self
            .contacts
            .find(filter)
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        Ok((contacts, total))
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> InquiryResult<Vec<(ContactStatus, u64)>> {
        let pipeline = vec![doc! { "$group": { "_id": "$status", "count": { "$sum": 1 } } }];
        let rows: Vec<Document> = self.contacts.aggregate(pipeline).await?.try_collect().await?;

        rows.into_iter()
            .map(|row| {
                let row: StatusCount = from_document(row)
                    .map_err(|e| InquiryError::Database(e.to_string()))?;
                Ok((row.status, row.count.max(0) as u64))
            })
            .collect()
    }
}

#[async_trait]
impl QuoteRepository for MongoInquiryRepository {
    #[instrument(skip(self))]
    async fn next_quote_sequence(&self, period: &str) -> InquiryResult<u32> {
        let counter = self
            .counters
            .find_one_and_update(
                doc! { "_id": format!("quote:{period}") },
                doc! { "$inc": { "seq": 1 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| InquiryError::Database("quote counter was not returned".into()))?;

        match counter.get("seq") {
            Some(Bson::Int32(n)) if *n > 0 => Ok(*n as u32),
            Some(Bson::Int64(n)) if *n > 0 => u32::try_from(*n)
                .map_err(|_| InquiryError::Database(format!("quote counter overflow: {n}"))),
            other => Err(InquiryError::Database(format!(
                "unexpected quote counter value: {other:?}"
            ))),
        }
    }

    #[instrument(skip(self, quote), fields(quote_number = %quote.quote_number))]
    async fn insert_quote(&self, quote: &Quote) -> InquiryResult<()> {
        self.quotes.insert_one(quote).await?;
        tracing::info!("Quote stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientInfo, ContactSubmission, ServiceInterest};
    use test_utils::TestMongo;

    fn contact(name: &str, message: &str, service: Option<ServiceInterest>) -> Contact {
        Contact::new(
            ContactSubmission {
                name: name.into(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: None,
                subject: None,
                service,
                message: message.into(),
            },
            ClientInfo::default(),
        )
    }

    #[test]
    fn test_search_is_escaped() {
        let filter = ContactFilter {
            search: Some("a+b".into()),
            ..Default::default()
        };
        let document = contact_filter(&filter);
        let branches = document.get_array("$or").unwrap();
        assert_eq!(branches.len(), 4);
        assert_eq!(
            branches[0].as_document().unwrap().get_document("name").unwrap().get_str("$regex").unwrap(),
            r"a\+b"
        );
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_list_and_count_contacts() {
        let mongo = TestMongo::new().await;
        let repo = MongoInquiryRepository::new(&mongo.database("inquiries_test"));
        repo.init_indexes().await.unwrap();

        repo.insert_contact(&contact("Asha", "Need a bulk paracetamol quote", Some(ServiceInterest::BulkOrder)))
            .await
            .unwrap();
        repo.insert_contact(&contact("Ravi", "Partnership enquiry for Pune", None))
            .await
            .unwrap();

        let filter = ContactFilter {
            search: Some("PARACETAMOL".into()),
            ..Default::default()
        };
        let (found, total) = repo.list_contacts(&filter, Pagination::new(1, 10)).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].name, "Asha");

        let counts = repo.count_by_status().await.unwrap();
        assert_eq!(counts, vec![(ContactStatus::New, 2)]);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_quote_sequence_increments_per_period() {
        let mongo = TestMongo::new().await;
        let repo = MongoInquiryRepository::new(&mongo.database("inquiries_test"));

        assert_eq!(repo.next_quote_sequence("202610").await.unwrap(), 1);
        assert_eq!(repo.next_quote_sequence("202610").await.unwrap(), 2);
        assert_eq!(repo.next_quote_sequence("202611").await.unwrap(), 1);
    }
}
