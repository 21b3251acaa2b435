use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{NewsError, NewsResult};
use crate::models::{Article, NewsListing, NewsPageInfo, NewsQuery};
use crate::repository::NewsRepository;

pub struct NewsService<R: NewsRepository> {
    repository: Arc<R>,
}

impl<R: NewsRepository> NewsService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_news(&self, query: &NewsQuery) -> NewsResult<NewsListing> {
        let filter = query.filter()?;
        let pagination = query.pagination();

        let (news, total) = self.repository.list_published(&filter, pagination).await?;

        Ok(NewsListing {
            news,
            pagination: NewsPageInfo::new(pagination, total),
        })
    }

    /// Fetch a published article, counting the view.
    #[instrument(skip(self))]
    pub async fn get_article(&self, id: Uuid) -> NewsResult<Article> {
        self.repository
            .record_view(id)
            .await?
            .ok_or(NewsError::ArticleNotFound)
    }
}
