//! HTTP handlers for contact submissions and quote requests

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, header::USER_AGENT},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    ApiResponse, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, InternalServerErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::InquiryResult;
use crate::models::{
    Address, Adjustment, ClientInfo, Contact, ContactDirectory, ContactPageInfo, ContactQuery,
    ContactReceipt, ContactSource, ContactStatistics, ContactStatus, ContactSubmission,
    CustomerInfo, Priority, Quote, QuoteCreated, QuoteItem, QuoteItemRequest, QuoteRequest,
    QuoteStatus, ServiceInterest,
};
use crate::repository::{ContactRepository, QuoteRepository};
use crate::service::{ContactService, QuoteService};

/// OpenAPI documentation for inquiries
#[derive(OpenApi)]
#[openapi(
    paths(submit_contact, list_contacts, request_quote),
    components(
        schemas(
            ContactSubmission, Contact, ContactReceipt, ContactDirectory, ContactPageInfo,
            ContactStatistics, ContactStatus, ContactSource, Priority, ServiceInterest,
            QuoteRequest, QuoteItemRequest, CustomerInfo, Address, Quote, QuoteItem,
            Adjustment, QuoteStatus, QuoteCreated
        ),
        responses(BadRequestResponse, BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "Inquiries", description = "Contact form and quote requests")
    )
)]
pub struct ApiDoc;

/// Public write endpoints: `POST /contact` and `POST /quotes`
pub fn router<C, Q>(contacts: Arc<ContactService<C>>, quotes: Arc<QuoteService<Q>>) -> Router
where
    C: ContactRepository + 'static,
    Q: QuoteRepository + 'static,
{
    let contact_routes = Router::new()
        .route("/", post(submit_contact))
        .with_state(contacts);
    let quote_routes = Router::new()
        .route("/", post(request_quote))
        .with_state(quotes);

    Router::new()
        .nest("/contact", contact_routes)
        .nest("/quotes", quote_routes)
}

/// Admin listing at `GET /contact`. Access control belongs to the gateway.
pub fn admin_router<C: ContactRepository + 'static>(contacts: Arc<ContactService<C>>) -> Router {
    Router::new().nest(
        "/contact",
        Router::new()
            .route("/", get(list_contacts))
            .with_state(contacts),
    )
}

/// Client address from `x-forwarded-for` (first hop) or `x-real-ip`, and the user agent.
pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let ip_address = header("x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| header("x-real-ip"))
        .map(str::to_string);

    ClientInfo {
        ip_address,
        user_agent: header(USER_AGENT.as_str()).map(str::to_string),
    }
}

/// Submit the contact form
#[utoipa::path(
    post,
    path = "/contact",
    tag = "Inquiries",
    request_body = ContactSubmission,
    responses(
        (status = 201, description = "Submission stored", body = ApiResponse<ContactReceipt>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn submit_contact<C: ContactRepository>(
    State(service): State<Arc<ContactService<C>>>,
    headers: HeaderMap,
    ValidatedJson(submission): ValidatedJson<ContactSubmission>,
) -> InquiryResult<impl IntoResponse> {
    let receipt = service
        .submit_contact(submission, client_info(&headers))
        .await?;
    Ok(ApiResponse::ok(receipt)
        .with_message("Thank you for your message. We will get back to you soon!")
        .created())
}

/// List contact submissions with per-status statistics
#[utoipa::path(
    get,
    path = "/contact",
    tag = "Inquiries",
    params(ContactQuery),
    responses(
        (status = 200, description = "Page of contacts", body = ApiResponse<ContactDirectory>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_contacts<C: ContactRepository>(
    State(service): State<Arc<ContactService<C>>>,
    Query(query): Query<ContactQuery>,
) -> InquiryResult<ApiResponse<ContactDirectory>> {
    let directory = service.list_contacts(&query).await?;
    Ok(ApiResponse::ok(directory))
}

/// Request a quote
#[utoipa::path(
    post,
    path = "/quotes",
    tag = "Inquiries",
    request_body = QuoteRequest,
    responses(
        (status = 201, description = "Quote stored", body = ApiResponse<QuoteCreated>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn request_quote<Q: QuoteRepository>(
    State(service): State<Arc<QuoteService<Q>>>,
    ValidatedJson(request): ValidatedJson<QuoteRequest>,
) -> InquiryResult<impl IntoResponse> {
    let quote = service.request_quote(request).await?;
    Ok(ApiResponse::ok(QuoteCreated { quote })
        .with_message("Quote request submitted successfully")
        .created())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_info_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let info = client_info(&headers);
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_client_info_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.9"));

        let info = client_info(&headers);
        assert_eq!(info.ip_address.as_deref(), Some("198.51.100.9"));
        assert_eq!(info.user_agent, None);
    }
}
