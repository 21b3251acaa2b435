//! HTTP handlers for the catalogue

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    ApiResponse, UserIdentity, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
        UnauthorizedResponse,
    },
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::CatalogResult;
use crate::filter::{DirectoryQuery, LimitQuery, ListingQuery, PageInfo, ProductQuery, SearchQuery};
use crate::models::{
    CatalogProduct, Category, CategoryListing, CategorySummary, DosageForm, FilterFacets,
    Manufacturer, ManufacturerDirectory, ManufacturerInfo, ManufacturerListing,
    ManufacturerSummary, NewReview, Pricing, ProductDetail, ProductImage, ProductList,
    ProductListing, Ratings, Review, ReviewOutcome, SaltInfo, SearchResults, StockStatus,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;
use crate::source::{DataSource, Sourced};

/// Success envelope that also says which backend answered
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourcedResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
    pub data_source: DataSource,
    pub database_connected: bool,
}

impl<T> SourcedResponse<T> {
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl<T> From<Sourced<T>> for SourcedResponse<T> {
    fn from(sourced: Sourced<T>) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: sourced.value,
            data_source: sourced.source,
            database_connected: sourced.database_connected,
        }
    }
}

impl<T: Serialize> IntoResponse for SourcedResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// OpenAPI documentation for the catalogue
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        search_products,
        featured_products,
        products_by_category,
        products_by_manufacturer,
        get_product,
        add_review,
        quick_search,
        salt_lookup,
        manufacturer_lookup,
        list_manufacturers,
        get_manufacturer,
        list_categories,
    ),
    components(
        schemas(
            CatalogProduct, CategorySummary, ManufacturerSummary, Category, Manufacturer,
            Pricing, Ratings, Review, NewReview, ProductImage, DosageForm, StockStatus,
            FilterFacets, PageInfo, DataSource, ProductListing, ProductDetail, SearchResults,
            CategoryListing, ManufacturerListing, ProductList, ManufacturerDirectory,
            ReviewOutcome, SaltInfo, ManufacturerInfo
        ),
        responses(
            BadRequestResponse,
            BadRequestValidationResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            ConflictResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product browsing, search and reviews"),
        (name = "Catalog", description = "Degraded-mode search and exact lookups"),
        (name = "Manufacturers", description = "Manufacturer directory"),
        (name = "Categories", description = "Product categories")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<CatalogService<R>>;

/// Every catalogue route, relative to the API root
pub fn router<R: CatalogRepository + 'static>(service: CatalogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .nest("/products", products_router(Arc::clone(&shared_service)))
        .nest("/catalog", catalog_router(Arc::clone(&shared_service)))
        .nest("/manufacturers", manufacturers_router(Arc::clone(&shared_service)))
        .nest("/categories", categories_router(shared_service))
}

fn products_router<R: CatalogRepository + 'static>(service: SharedService<R>) -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/search", get(search_products))
        .route("/featured", get(featured_products))
        .route("/category/{category_id}", get(products_by_category))
        .route("/manufacturer/{manufacturer_id}", get(products_by_manufacturer))
        .route("/{id}", get(get_product))
        .route("/{id}/reviews", post(add_review))
        .with_state(service)
}

fn catalog_router<R: CatalogRepository + 'static>(service: SharedService<R>) -> Router {
    Router::new()
        .route("/search", get(quick_search))
        .route("/salt/{salt_name}", get(salt_lookup))
        .route("/manufacturer/{manufacturer_name}", get(manufacturer_lookup))
        .with_state(service)
}

fn manufacturers_router<R: CatalogRepository + 'static>(service: SharedService<R>) -> Router {
    Router::new()
        .route("/", get(list_manufacturers))
        .route("/{id}", get(get_manufacturer))
        .with_state(service)
}

fn categories_router<R: CatalogRepository + 'static>(service: SharedService<R>) -> Router {
    Router::new()
        .route("/", get(list_categories))
        .with_state(service)
}

/// List active products with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Page of products with filter facets", body = SourcedResponse<ProductListing>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    Query(query): Query<ProductQuery>,
) -> CatalogResult<SourcedResponse<ProductListing>> {
    let listing = service.list_products(&query).await?;
    Ok(listing.into())
}

/// Ranked text search merged with name matches
#[utoipa::path(
    get,
    path = "/products/search",
    tag = "Products",
    params(SearchQuery),
    responses(
        (status = 200, description = "Merged search results", body = SourcedResponse<SearchResults>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    Query(query): Query<SearchQuery>,
) -> CatalogResult<SourcedResponse<SearchResults>> {
    let results = service
        .search_products(query.q.as_deref(), &query.limit)
        .await?;
    Ok(results.into())
}

/// Top-rated and promoted products
#[utoipa::path(
    get,
    path = "/products/featured",
    tag = "Products",
    params(LimitQuery),
    responses(
        (status = 200, description = "Featured products", body = SourcedResponse<ProductList>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn featured_products<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    Query(query): Query<LimitQuery>,
) -> CatalogResult<SourcedResponse<ProductList>> {
    let featured = service.featured_products(&query.limit).await?;
    Ok(featured.into())
}

#[utoipa::path(
    get,
    path = "/products/category/{category_id}",
    tag = "Products",
    params(
        ("category_id" = Uuid, Path, description = "Category ID"),
        ListingQuery
    ),
    responses(
        (status = 200, description = "Products in the category", body = SourcedResponse<CategoryListing>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn products_by_category<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    Query(query): Query<ListingQuery>,
) -> CatalogResult<SourcedResponse<CategoryListing>> {
    let listing = service.products_by_category(id, &query).await?;
    Ok(listing.into())
}

#[utoipa::path(
    get,
    path = "/products/manufacturer/{manufacturer_id}",
    tag = "Products",
    params(
        ("manufacturer_id" = Uuid, Path, description = "Manufacturer ID"),
        ListingQuery
    ),
    responses(
        (status = 200, description = "Products of the manufacturer", body = SourcedResponse<ManufacturerListing>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn products_by_manufacturer<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    Query(query): Query<ListingQuery>,
) -> CatalogResult<SourcedResponse<ManufacturerListing>> {
    let listing = service.products_by_manufacturer(id, &query).await?;
    Ok(listing.into())
}

/// Product with related products from its category
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = SourcedResponse<ProductDetail>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<SourcedResponse<ProductDetail>> {
    let detail = service.get_product(id).await?;
    Ok(detail.into())
}

/// Review a product, once per user
#[utoipa::path(
    post,
    path = "/products/{id}/reviews",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("x-user-id" = Uuid, Header, description = "Reviewer, set by the authentication gateway")
    ),
    request_body = NewReview,
    responses(
        (status = 201, description = "Review added", body = ApiResponse<ReviewOutcome>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_review<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    UserIdentity(user): UserIdentity,
    ValidatedJson(input): ValidatedJson<NewReview>,
) -> CatalogResult<impl IntoResponse> {
    let outcome = service.add_review(id, user, input).await?;
    Ok(ApiResponse::ok(outcome)
        .with_message("Review added successfully")
        .created())
}

/// Search by product, brand, generic, manufacturer or category name
#[utoipa::path(
    get,
    path = "/catalog/search",
    tag = "Catalog",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching products", body = SourcedResponse<Vec<CatalogProduct>>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn quick_search<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    Query(query): Query<SearchQuery>,
) -> CatalogResult<SourcedResponse<Vec<CatalogProduct>>> {
    let results = service.quick_search(query.q.as_deref()).await?;
    let count = results.value.len();
    let q = query.q.as_deref().unwrap_or_default().trim();

    Ok(SourcedResponse::from(results)
        .with_count(count)
        .with_message(format!("Found {count} product(s) matching \"{q}\"")))
}

/// Brands and makers of one generic name
#[utoipa::path(
    get,
    path = "/catalog/salt/{salt_name}",
    tag = "Catalog",
    params(
        ("salt_name" = String, Path, description = "Generic name, matched exactly ignoring case")
    ),
    responses(
        (status = 200, description = "Salt information", body = SourcedResponse<Vec<SaltInfo>>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn salt_lookup<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    Path(salt_name): Path<String>,
) -> CatalogResult<SourcedResponse<Vec<SaltInfo>>> {
    let info = service.salt_lookup(&salt_name).await?;
    Ok(SourcedResponse::from(info.map(|salt| vec![salt]))
        .with_message(format!("Found information for {salt_name}")))
}

/// Manufacturer and its products by name
#[utoipa::path(
    get,
    path = "/catalog/manufacturer/{manufacturer_name}",
    tag = "Catalog",
    params(
        ("manufacturer_name" = String, Path, description = "Name or company name, matched exactly ignoring case")
    ),
    responses(
        (status = 200, description = "Manufacturer information", body = SourcedResponse<Vec<ManufacturerInfo>>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn manufacturer_lookup<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    Path(manufacturer_name): Path<String>,
) -> CatalogResult<SourcedResponse<Vec<ManufacturerInfo>>> {
    let info = service.manufacturer_lookup(&manufacturer_name).await?;
    Ok(SourcedResponse::from(info.map(|info| vec![info]))
        .with_message(format!("Found information for {manufacturer_name}")))
}

#[utoipa::path(
    get,
    path = "/manufacturers",
    tag = "Manufacturers",
    params(DirectoryQuery),
    responses(
        (status = 200, description = "Page of manufacturers", body = SourcedResponse<ManufacturerDirectory>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_manufacturers<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    Query(query): Query<DirectoryQuery>,
) -> CatalogResult<SourcedResponse<ManufacturerDirectory>> {
    let directory = service.list_manufacturers(&query).await?;
    Ok(directory.into())
}

#[utoipa::path(
    get,
    path = "/manufacturers/{id}",
    tag = "Manufacturers",
    params(
        ("id" = Uuid, Path, description = "Manufacturer ID")
    ),
    responses(
        (status = 200, description = "Manufacturer found", body = SourcedResponse<Manufacturer>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_manufacturer<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<SourcedResponse<Manufacturer>> {
    let manufacturer = service.get_manufacturer(id).await?;
    Ok(manufacturer.into())
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Active categories", body = SourcedResponse<Vec<Category>>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
) -> CatalogResult<SourcedResponse<Vec<Category>>> {
    let categories = service.list_categories().await?;
    Ok(categories.into())
}
