//! HTTP handlers for company news

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use axum_helpers::{
    ApiResponse, UuidPath,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse, NotFoundResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::NewsResult;
use crate::models::{
    Article, ArticleView, NewsCategory, NewsImage, NewsListing, NewsPageInfo, NewsQuery,
    NewsStatus, NewsSummary,
};
use crate::repository::NewsRepository;
use crate::service::NewsService;

/// OpenAPI documentation for news
#[derive(OpenApi)]
#[openapi(
    paths(list_news, get_article),
    components(
        schemas(
            Article, ArticleView, NewsCategory, NewsImage, NewsListing, NewsPageInfo,
            NewsStatus, NewsSummary
        ),
        responses(BadRequestResponse, NotFoundResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "News", description = "Published company news")
    )
)]
pub struct ApiDoc;

pub fn router<R: NewsRepository + 'static>(service: NewsService<R>) -> Router {
    let routes = Router::new()
        .route("/", get(list_news))
        .route("/{id}", get(get_article))
        .with_state(Arc::new(service));

    Router::new().nest("/news", routes)
}

/// List published news, newest first
#[utoipa::path(
    get,
    path = "/news",
    tag = "News",
    params(NewsQuery),
    responses(
        (status = 200, description = "Page of news", body = ApiResponse<NewsListing>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_news<R: NewsRepository>(
    State(service): State<Arc<NewsService<R>>>,
    Query(query): Query<NewsQuery>,
) -> NewsResult<ApiResponse<NewsListing>> {
    let listing = service.list_news(&query).await?;
    Ok(ApiResponse::ok(listing))
}

/// Read a published article
#[utoipa::path(
    get,
    path = "/news/{id}",
    tag = "News",
    params(
        ("id" = Uuid, Path, description = "Article ID")
    ),
    responses(
        (status = 200, description = "The article", body = ApiResponse<ArticleView>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_article<R: NewsRepository>(
    State(service): State<Arc<NewsService<R>>>,
    UuidPath(id): UuidPath,
) -> NewsResult<ApiResponse<ArticleView>> {
    let news = service.get_article(id).await?;
    Ok(ApiResponse::ok(ArticleView { news }))
}
