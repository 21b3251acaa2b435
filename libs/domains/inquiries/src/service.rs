//! Contact and quote services
//!
//! Both write straight to the store. There is no fallback dataset for
//! inquiries: a store failure fails the request.

use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

use crate::error::InquiryResult;
use crate::mailer::{Mailer, contact_confirmation, contact_notification};
use crate::models::{
    ClientInfo, Contact, ContactDirectory, ContactPageInfo, ContactQuery, ContactReceipt,
    ContactStatistics, ContactSubmission, Quote, QuoteRequest, quote_number, quote_period,
};
use crate::repository::{ContactRepository, QuoteRepository};

pub struct ContactService<R: ContactRepository> {
    repository: Arc<R>,
    mailer: Arc<dyn Mailer>,
    admin_email: String,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repository: R, mailer: Arc<dyn Mailer>, admin_email: impl Into<String>) -> Self {
        Self {
            repository: Arc::new(repository),
            mailer,
            admin_email: admin_email.into(),
        }
    }

    /// Store a submission, then mail the sender and the admin.
    ///
    /// Mail failures are logged and do not fail the submission.
    #[instrument(skip(self, submission, client), fields(email = %submission.email))]
    pub async fn submit_contact(
        &self,
        submission: ContactSubmission,
        client: ClientInfo,
    ) -> InquiryResult<ContactReceipt> {
        let contact = Contact::new(submission, client);
        self.repository.insert_contact(&contact).await?;

        let mails = [
            ("confirmation", contact_confirmation(&contact)),
            ("admin notification", contact_notification(&contact, &self.admin_email)),
        ];
        for (kind, mail) in mails {
            if let Err(err) = self.mailer.send(mail).await {
                tracing::warn!(contact_id = %contact.id, kind, error = %err, "Contact mail failed");
            }
        }

        tracing::info!(contact_id = %contact.id, "Contact submission received");
        Ok(ContactReceipt::from(&contact))
    }

    #[instrument(skip(self))]
    pub async fn list_contacts(&self, query: &ContactQuery) -> InquiryResult<ContactDirectory> {
        let filter = query.filter()?;
        let pagination = query.pagination();

        let (contacts, total) = self.repository.list_contacts(&filter, pagination).await?;
        let counts = self.repository.count_by_status().await?;

        Ok(ContactDirectory {
            contacts,
            pagination: ContactPageInfo::new(pagination, total),
            statistics: ContactStatistics::from_counts(counts),
        })
    }
}

pub struct QuoteService<R: QuoteRepository> {
    repository: Arc<R>,
}

impl<R: QuoteRepository> QuoteService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Number, price and store a quote request.
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn request_quote(&self, request: QuoteRequest) -> InquiryResult<Quote> {
        let now = Utc::now();
        let period = quote_period(now);
        let sequence = self.repository.next_quote_sequence(&period).await?;

        let quote = Quote::new(request, quote_number(&period, sequence), now);
        self.repository.insert_quote(&quote).await?;

        tracing::info!(quote_number = %quote.quote_number, final_amount = quote.final_amount, "Quote requested");
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InquiryError;
    use crate::mailer::{MailError, MockMailer};
    use crate::memory::InMemoryInquiryRepository;
    use crate::models::{ContactStatus, CustomerInfo, QuoteItemRequest, ServiceInterest};
    use crate::repository::{MockContactRepository, MockQuoteRepository};
    use uuid::Uuid;

    fn submission(name: &str, message: &str) -> ContactSubmission {
        ContactSubmission {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            subject: None,
            service: Some(ServiceInterest::Pharmacy),
            message: message.into(),
        }
    }

    fn quote_request() -> QuoteRequest {
        QuoteRequest {
            customer_info: CustomerInfo {
                name: "City Pharmacy".into(),
                email: "orders@citypharmacy.in".into(),
                phone: "+911140001000".into(),
                company_name: Some("City Pharmacy LLP".into()),
                address: None,
            },
            items: vec![QuoteItemRequest {
                product: Uuid::now_v7(),
                product_name: Some("Crocin".into()),
                quantity: 100,
                unit_price: Some(20.0),
                specifications: None,
            }],
            notes: None,
            discount_percentage: None,
            tax_percentage: None,
        }
    }

    fn quiet_mailer() -> Arc<dyn Mailer> {
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_| Ok(()));
        Arc::new(mailer)
    }

    #[tokio::test]
    async fn test_submission_sends_both_mails() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|mail| mail.to == "asha@example.com")
            .times(1)
            .returning(|_| Ok(()));
        mailer
            .expect_send()
            .withf(|mail| mail.to == "admin@pharma.example")
            .times(1)
            .returning(|_| Ok(()));

        let repo = InMemoryInquiryRepository::new();
        let service = ContactService::new(repo.clone(), Arc::new(mailer), "admin@pharma.example");

        let receipt = service
            .submit_contact(
                submission("Asha", "Please share your wholesale price list."),
                ClientInfo::default(),
            )
            .await
            .unwrap();

        assert_eq!(receipt.status, ContactStatus::New);
        let stored = repo.contacts().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, receipt.contact_id);
        assert_eq!(stored[0].subject, "Pharmacy Inquiry");
    }

    #[tokio::test]
    async fn test_mail_failure_does_not_fail_submission() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(2)
            .returning(|_| Err(MailError("smtp unreachable".into())));

        let repo = InMemoryInquiryRepository::new();
        let service = ContactService::new(repo.clone(), Arc::new(mailer), "admin@pharma.example");

        let result = service
            .submit_contact(submission("Ravi", "Do you ship to Nagpur?"), ClientInfo::default())
            .await;

        assert!(result.is_ok());
        assert_eq!(repo.contacts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_fails_submission_without_mail() {
        let mut repo = MockContactRepository::new();
        repo.expect_insert_contact()
            .returning(|_| Err(InquiryError::Database("write concern failed".into())));
        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let service = ContactService::new(repo, Arc::new(mailer), "admin@pharma.example");
        let err = service
            .submit_contact(submission("Asha", "Please call me back today."), ClientInfo::default())
            .await
            .unwrap_err();

        assert!(matches!(err, InquiryError::Database(_)));
    }

    #[tokio::test]
    async fn test_list_contacts_pages_and_counts() {
        let repo = InMemoryInquiryRepository::new();
        let service = ContactService::new(repo, quiet_mailer(), "admin@pharma.example");
        for n in 0..3 {
            service
                .submit_contact(
                    submission(&format!("Buyer{n}"), "Requesting the monthly catalogue."),
                    ClientInfo::default(),
                )
                .await
                .unwrap();
        }

        let query = ContactQuery {
            limit: Some("2".into()),
            ..Default::default()
        };
        let directory = service.list_contacts(&query).await.unwrap();

        assert_eq!(directory.contacts.len(), 2);
        assert_eq!(directory.contacts[0].name, "Buyer2");
        assert_eq!(directory.pagination.total_contacts, 3);
        assert!(directory.pagination.has_next);
        assert_eq!(directory.statistics.new, 3);
    }

    #[tokio::test]
    async fn test_list_contacts_rejects_unknown_status() {
        let mut repo = MockContactRepository::new();
        repo.expect_list_contacts().never();
        let service = ContactService::new(repo, quiet_mailer(), "admin@pharma.example");

        let query = ContactQuery {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.list_contacts(&query).await,
            Err(InquiryError::InvalidOption { option: "status", .. })
        ));
    }

    #[tokio::test]
    async fn test_quote_numbers_follow_the_month_counter() {
        let service = QuoteService::new(InMemoryInquiryRepository::new());

        let first = service.request_quote(quote_request()).await.unwrap();
        let second = service.request_quote(quote_request()).await.unwrap();

        let prefix = format!("QT{}", quote_period(Utc::now()));
        assert_eq!(first.quote_number, format!("{prefix}0001"));
        assert_eq!(second.quote_number, format!("{prefix}0002"));
        assert_eq!(first.total_amount, 2000.0);
        assert_eq!(first.final_amount, 2240.0);
    }

    #[tokio::test]
    async fn test_quote_store_failure_propagates() {
        let mut repo = MockQuoteRepository::new();
        repo.expect_next_quote_sequence().returning(|_| Ok(1));
        repo.expect_insert_quote()
            .returning(|_| Err(InquiryError::Database("duplicate key".into())));

        let err = QuoteService::new(repo)
            .request_quote(quote_request())
            .await
            .unwrap_err();
        assert!(matches!(err, InquiryError::Database(_)));
    }
}
