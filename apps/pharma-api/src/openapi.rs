//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pharma Distributor API",
        version = "0.1.0",
        description = "Medicine catalogue, search, contact and quote requests, and company news"
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    nest(
        (path = "/api", api = domain_catalog::ApiDoc),
        (path = "/api", api = domain_inquiries::ApiDoc),
        (path = "/api", api = domain_news::ApiDoc)
    )
)]
pub struct ApiDoc;
