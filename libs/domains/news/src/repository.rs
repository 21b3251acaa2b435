use async_trait::async_trait;
use uuid::Uuid;

use crate::error::NewsResult;
use crate::models::{Article, NewsFilter, NewsSummary, Pagination};

/// Storage for news articles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// One page of matching articles, newest `publishedAt` first, and the match count.
    async fn list_published(
        &self,
        filter: &NewsFilter,
        pagination: Pagination,
    ) -> NewsResult<(Vec<NewsSummary>, u64)>;

    /// Count a view of a published article and return it with the new count.
    ///
    /// `None` when the article is missing or not published; nothing is counted then.
    async fn record_view(&self, id: Uuid) -> NewsResult<Option<Article>>;

    async fn insert_article(&self, article: &Article) -> NewsResult<()>;
}
