use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{InquiryError, InquiryResult};

pub const CONTACT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const DEFAULT_TAX_PERCENTAGE: f64 = 12.0;
/// Days a quote stays valid after it is requested
pub const QUOTE_VALIDITY_DAYS: u64 = 30;

/// `+` optional, then 2 to 15 digits without a leading zero
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (2..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0');
    if !valid {
        return Err(ValidationError::new("invalid_phone"));
    }
    Ok(())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Service a contact submission is about
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ServiceInterest {
    General,
    GeneralMedicine,
    Vaccination,
    Laboratory,
    LaboratoryTests,
    Specialized,
    SpecializedCare,
    Emergency,
    EmergencyCare,
    Pharmacy,
    PharmacyServices,
    BulkOrder,
    Distribution,
    Partnership,
    Complaint,
    Feedback,
}

impl ServiceInterest {
    /// Subject used when the sender gave none, e.g. `Bulk-order Inquiry`.
    pub fn default_subject(service: Option<Self>) -> String {
        let Some(service) = service else {
            return "General Inquiry".to_string();
        };
        let wire = service.to_string();
        let mut chars = wire.chars();
        match chars.next() {
            Some(first) => format!("{}{} Inquiry", first.to_ascii_uppercase(), chars.as_str()),
            None => "General Inquiry".to_string(),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContactStatus {
    #[default]
    New,
    InProgress,
    Resolved,
    Closed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Channel a contact arrived through
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContactSource {
    #[default]
    Website,
    MobileApp,
    Phone,
    Email,
    Whatsapp,
}

/// Body of `POST /contact`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ContactSubmission {
    #[validate(length(min = 2, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    pub service: Option<ServiceInterest>,
    #[validate(length(min = 10, max = 2000), custom(function = "validate_not_blank"))]
    pub message: String,
}

/// Where a submission came from, as seen by the HTTP layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Contact as stored in the `contacts` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceInterest>,
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub source: ContactSource,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub follow_up_required: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// A fresh `new`/`medium` website contact from a validated submission.
    pub fn new(submission: ContactSubmission, client: ClientInfo) -> Self {
        let now = Utc::now();
        let subject = submission
            .subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ServiceInterest::default_subject(submission.service));

        Self {
            id: Uuid::now_v7(),
            name: submission.name.trim().to_string(),
            email: submission.email.trim().to_lowercase(),
            phone: submission.phone,
            subject,
            service: submission.service,
            message: submission.message.trim().to_string(),
            status: ContactStatus::New,
            priority: Priority::Medium,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
            source: ContactSource::Website,
            tags: Vec::new(),
            follow_up_required: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// `POST /contact` payload
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactReceipt {
    pub contact_id: Uuid,
    pub status: ContactStatus,
    pub submitted_at: DateTime<Utc>,
}

impl From<&Contact> for ContactReceipt {
    fn from(contact: &Contact) -> Self {
        Self {
            contact_id: contact.id,
            status: contact.status,
            submitted_at: contact.created_at,
        }
    }
}

/// Query options of the admin contact listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactQuery {
    /// `new`, `in-progress`, `resolved` or `closed`
    pub status: Option<String>,
    /// `low`, `medium`, `high` or `urgent`
    pub priority: Option<String>,
    pub service: Option<String>,
    /// Case-insensitive match on name, email, subject or message
    pub search: Option<String>,
    pub page: Option<String>,
    /// Page size (default 10, max 100)
    pub limit: Option<String>,
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_enum<T: FromStr>(option: &'static str, raw: &Option<String>) -> InquiryResult<Option<T>> {
    present(raw)
        .map(|value| T::from_str(value).map_err(|_| InquiryError::invalid_option(option, value)))
        .transpose()
}

fn parse_positive(raw: &Option<String>) -> Option<u64> {
    present(raw)?.parse::<u64>().ok().filter(|n| *n > 0)
}

impl ContactQuery {
    pub fn filter(&self) -> InquiryResult<ContactFilter> {
        Ok(ContactFilter {
            status: parse_enum("status", &self.status)?,
            priority: parse_enum("priority", &self.priority)?,
            service: parse_enum("service", &self.service)?,
            search: present(&self.search).map(str::to_string),
        })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(
            parse_positive(&self.page).unwrap_or(1),
            parse_positive(&self.limit).unwrap_or(CONTACT_PAGE_SIZE),
        )
    }
}

/// Admin listing predicates; every present field must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    pub priority: Option<Priority>,
    pub service: Option<ServiceInterest>,
    pub search: Option<String>,
}

impl ContactFilter {
    pub fn matches(&self, contact: &Contact) -> bool {
        let search_hit = self.search.as_deref().is_none_or(|search| {
            let needle = search.to_lowercase();
            [&contact.name, &contact.email, &contact.subject, &contact.message]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        });

        self.status.is_none_or(|s| contact.status == s)
            && self.priority.is_none_or(|p| contact.priority == p)
            && self.service.is_none_or(|s| contact.service == Some(s))
            && search_hit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactPageInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_contacts: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl ContactPageInfo {
    pub fn new(pagination: Pagination, total: u64) -> Self {
        let total_pages = total.div_ceil(pagination.limit);
        Self {
            current_page: pagination.page,
            total_pages,
            total_contacts: total,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

/// Contacts per status over the whole collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub struct ContactStatistics {
    pub new: u64,
    #[serde(rename = "in-progress")]
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
}

impl ContactStatistics {
    pub fn from_counts(counts: impl IntoIterator<Item = (ContactStatus, u64)>) -> Self {
        let mut stats = Self::default();
        for (status, count) in counts {
            let slot = match status {
                ContactStatus::New => &mut stats.new,
                ContactStatus::InProgress => &mut stats.in_progress,
                ContactStatus::Resolved => &mut stats.resolved,
                ContactStatus::Closed => &mut stats.closed,
            };
            *slot += count;
        }
        stats
    }
}

/// `GET /contact` payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactDirectory {
    pub contacts: Vec<Contact>,
    pub pagination: ContactPageInfo,
    pub statistics: ContactStatistics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// One line of a quote request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItemRequest {
    /// Product reference
    pub product: Uuid,
    pub product_name: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[validate(range(min = 0.0))]
    pub unit_price: Option<f64>,
    #[validate(length(max = 1000))]
    pub specifications: Option<String>,
}

/// Body of `POST /quotes`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[validate(nested)]
    pub customer_info: CustomerInfo,
    #[validate(length(min = 1), nested)]
    pub items: Vec<QuoteItemRequest>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount_percentage: Option<f64>,
    #[validate(range(min = 0.0))]
    pub tax_percentage: Option<f64>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Sent,
    Accepted,
    Rejected,
    Expired,
    Converted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub product: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    /// `quantity × unitPrice`; absent for unpriced lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<String>,
}

impl From<QuoteItemRequest> for QuoteItem {
    fn from(item: QuoteItemRequest) -> Self {
        Self {
            total_price: item
                .unit_price
                .map(|price| round_currency(price * f64::from(item.quantity))),
            product: item.product,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            specifications: item.specifications,
        }
    }
}

/// A percentage and the amount it came to
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Adjustment {
    pub percentage: f64,
    pub amount: f64,
}

/// Round to two decimal places.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Amounts of a quote derived from its lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteTotals {
    pub total_amount: f64,
    pub discount: Adjustment,
    pub tax: Adjustment,
    pub final_amount: f64,
}

impl QuoteTotals {
    /// Tax applies to the amount left after the discount.
    pub fn compute(items: &[QuoteItem], discount_percentage: f64, tax_percentage: f64) -> Self {
        let total_amount = round_currency(items.iter().filter_map(|i| i.total_price).sum());
        let discount_amount = round_currency(total_amount * discount_percentage / 100.0);
        let taxable = total_amount - discount_amount;
        let tax_amount = round_currency(taxable * tax_percentage / 100.0);

        Self {
            total_amount,
            discount: Adjustment {
                percentage: discount_percentage,
                amount: discount_amount,
            },
            tax: Adjustment {
                percentage: tax_percentage,
                amount: tax_amount,
            },
            final_amount: round_currency(taxable + tax_amount),
        }
    }
}

/// `QT<yyyy><mm><seq:04>`
pub fn quote_number(period: &str, sequence: u32) -> String {
    format!("QT{period}{sequence:04}")
}

/// Month a quote number is counted in, as `yyyymm`.
pub fn quote_period(at: DateTime<Utc>) -> String {
    at.format("%Y%m").to_string()
}

/// Quote as stored in the `quotes` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub quote_number: String,
    pub customer_info: CustomerInfo,
    pub items: Vec<QuoteItem>,
    pub total_amount: f64,
    pub discount: Adjustment,
    pub tax: Adjustment,
    pub final_amount: f64,
    #[serde(default)]
    pub status: QuoteStatus,
    pub valid_until: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(request: QuoteRequest, quote_number: String, now: DateTime<Utc>) -> Self {
        let items: Vec<QuoteItem> = request.items.into_iter().map(QuoteItem::from).collect();
        let totals = QuoteTotals::compute(
            &items,
            request.discount_percentage.unwrap_or(0.0),
            request.tax_percentage.unwrap_or(DEFAULT_TAX_PERCENTAGE),
        );
        let mut customer_info = request.customer_info;
        customer_info.email = customer_info.email.trim().to_lowercase();

        Self {
            id: Uuid::now_v7(),
            quote_number,
            customer_info,
            items,
            total_amount: totals.total_amount,
            discount: totals.discount,
            tax: totals.tax,
            final_amount: totals.final_amount,
            status: QuoteStatus::Pending,
            valid_until: valid_until(now),
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
            updated_at: now,
        }
    }
}

fn valid_until(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_days(chrono::Days::new(QUOTE_VALIDITY_DAYS))
        .or_else(|| now.checked_add_months(Months::new(1)))
        .unwrap_or(now)
}

/// `POST /quotes` payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuoteCreated {
    pub quote: Quote,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Asha Verma".into(),
            email: "Asha@Example.com".into(),
            phone: Some("+919811122233".into()),
            subject: None,
            service: Some(ServiceInterest::BulkOrder),
            message: "We need 500 strips of paracetamol monthly.".into(),
        }
    }

    fn item(quantity: u32, unit_price: Option<f64>) -> QuoteItemRequest {
        QuoteItemRequest {
            product: Uuid::now_v7(),
            product_name: None,
            quantity,
            unit_price,
            specifications: None,
        }
    }

    fn quote_request(items: Vec<QuoteItemRequest>) -> QuoteRequest {
        QuoteRequest {
            customer_info: CustomerInfo {
                name: "City Pharmacy".into(),
                email: "orders@citypharmacy.in".into(),
                phone: "+911140001000".into(),
                company_name: None,
                address: None,
            },
            items,
            notes: None,
            discount_percentage: None,
            tax_percentage: None,
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        assert!(submission().validate().is_ok());
    }

    #[test]
    fn test_submission_rules() {
        let mut s = submission();
        s.name = "A".into();
        assert!(s.validate().unwrap_err().field_errors().contains_key("name"));

        let mut s = submission();
        s.message = "too short".into();
        assert!(s.validate().unwrap_err().field_errors().contains_key("message"));

        let mut s = submission();
        s.email = "not-an-email".into();
        assert!(s.validate().unwrap_err().field_errors().contains_key("email"));

        let mut s = submission();
        s.phone = Some("0123".into());
        assert!(s.validate().unwrap_err().field_errors().contains_key("phone"));
    }

    #[test]
    fn test_phone_pattern() {
        assert!(validate_phone("+14155552671").is_ok());
        assert!(validate_phone("98").is_ok());
        assert!(validate_phone("9").is_err());
        assert!(validate_phone("+0811").is_err());
        assert!(validate_phone("98-11").is_err());
        assert!(validate_phone("1234567890123456").is_err());
    }

    #[test]
    fn test_unknown_service_is_rejected_on_deserialize() {
        let body = serde_json::json!({
            "name": "Asha",
            "email": "asha@example.com",
            "service": "teleportation",
            "message": "Hello there, please call me."
        });
        assert!(serde_json::from_value::<ContactSubmission>(body).is_err());
    }

    #[test]
    fn test_default_subject() {
        assert_eq!(ServiceInterest::default_subject(None), "General Inquiry");
        assert_eq!(
            ServiceInterest::default_subject(Some(ServiceInterest::BulkOrder)),
            "Bulk-order Inquiry"
        );
        assert_eq!(
            ServiceInterest::default_subject(Some(ServiceInterest::Pharmacy)),
            "Pharmacy Inquiry"
        );
    }

    #[test]
    fn test_new_contact_defaults() {
        let client = ClientInfo {
            ip_address: Some("203.0.113.7".into()),
            user_agent: Some("curl/8.5".into()),
        };
        let contact = Contact::new(submission(), client);

        assert_eq!(contact.status, ContactStatus::New);
        assert_eq!(contact.priority, Priority::Medium);
        assert_eq!(contact.source, ContactSource::Website);
        assert_eq!(contact.subject, "Bulk-order Inquiry");
        assert_eq!(contact.email, "asha@example.com");
        assert_eq!(contact.ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_given_subject_is_kept() {
        let mut s = submission();
        s.subject = Some("  Price list request ".into());
        assert_eq!(Contact::new(s, ClientInfo::default()).subject, "Price list request");
    }

    #[test]
    fn test_contact_filter() {
        let contact = Contact::new(submission(), ClientInfo::default());

        let by_search = ContactFilter {
            search: Some("PARACETAMOL".into()),
            ..Default::default()
        };
        assert!(by_search.matches(&contact));

        let by_status = ContactFilter {
            status: Some(ContactStatus::Closed),
            ..Default::default()
        };
        assert!(!by_status.matches(&contact));

        let by_service = ContactFilter {
            service: Some(ServiceInterest::BulkOrder),
            priority: Some(Priority::Medium),
            ..Default::default()
        };
        assert!(by_service.matches(&contact));
    }

    #[test]
    fn test_contact_query_parsing() {
        let query = ContactQuery {
            status: Some("in-progress".into()),
            page: Some("x".into()),
            limit: Some("500".into()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.status, Some(ContactStatus::InProgress));
        assert_eq!(query.pagination(), Pagination::new(1, 100));

        let bad = ContactQuery {
            priority: Some("critical".into()),
            ..Default::default()
        };
        assert!(matches!(
            bad.filter(),
            Err(InquiryError::InvalidOption { option: "priority", .. })
        ));
    }

    #[test]
    fn test_statistics_wire_shape() {
        let stats = ContactStatistics::from_counts([
            (ContactStatus::New, 3),
            (ContactStatus::InProgress, 1),
        ]);
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            serde_json::json!({ "new": 3, "in-progress": 1, "resolved": 0, "closed": 0 })
        );
    }

    #[test]
    fn test_quote_totals() {
        let request = QuoteRequest {
            discount_percentage: Some(10.0),
            ..quote_request(vec![item(10, Some(20.0)), item(5, Some(36.0)), item(2, None)])
        };
        let now = Utc::now();
        let quote = Quote::new(request, quote_number("202610", 7), now);

        assert_eq!(quote.items[0].total_price, Some(200.0));
        assert_eq!(quote.items[2].total_price, None);
        assert_eq!(quote.total_amount, 380.0);
        assert_eq!(quote.discount.amount, 38.0);
        assert_eq!(quote.tax.percentage, DEFAULT_TAX_PERCENTAGE);
        assert_eq!(quote.tax.amount, 41.04);
        assert_eq!(quote.final_amount, 383.04);
        assert_eq!(quote.quote_number, "QT2026100007");
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert_eq!((quote.valid_until - now).num_days(), 30);
    }

    #[test]
    fn test_quote_request_rules() {
        assert!(quote_request(vec![]).validate().is_err());
        assert!(quote_request(vec![item(0, Some(1.0))]).validate().is_err());

        let over_discount = QuoteRequest {
            discount_percentage: Some(120.0),
            ..quote_request(vec![item(1, Some(1.0))])
        };
        assert!(over_discount.validate().is_err());
        assert!(quote_request(vec![item(1, None)]).validate().is_ok());
    }

    #[test]
    fn test_quote_period() {
        let at = DateTime::parse_from_rfc3339("2026-03-09T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(quote_period(at), "202603");
        assert_eq!(quote_number(&quote_period(at), 12), "QT2026030012");
    }
}
