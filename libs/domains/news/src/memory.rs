//! In-memory implementation of NewsRepository

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::NewsResult;
use crate::models::{Article, NewsFilter, NewsSummary, Pagination};
use crate::repository::NewsRepository;

/// Articles held in process memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNewsRepository {
    articles: Arc<RwLock<Vec<Article>>>,
}

impl InMemoryNewsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        Self {
            articles: Arc::new(RwLock::new(articles.into_iter().collect())),
        }
    }
}

#[async_trait]
impl NewsRepository for InMemoryNewsRepository {
    async fn list_published(
        &self,
        filter: &NewsFilter,
        pagination: Pagination,
    ) -> NewsResult<(Vec<NewsSummary>, u64)> {
        let articles = self.articles.read().await;

        let mut matching: Vec<&Article> = articles.iter().filter(|a| filter.matches(a)).collect();
        matching.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(pagination.skip() as usize)
            .take(pagination.limit as usize)
            .map(NewsSummary::from)
            .collect();
        Ok((page, total))
    }

    async fn record_view(&self, id: Uuid) -> NewsResult<Option<Article>> {
        let mut articles = self.articles.write().await;
        Ok(articles
            .iter_mut()
            .find(|a| a.id == id && a.is_published())
            .map(|article| {
                article.views += 1;
                article.clone()
            }))
    }

    async fn insert_article(&self, article: &Article) -> NewsResult<()> {
        self.articles.write().await.push(article.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewsCategory;
    use chrono::{TimeDelta, Utc};

    fn article(title: &str, age_days: i64) -> Article {
        Article::draft(title, "excerpt", "body text", NewsCategory::CompanyNews, Uuid::now_v7())
            .published_at(Utc::now() - TimeDelta::days(age_days))
    }

    #[tokio::test]
    async fn test_newest_first() {
        let repo = InMemoryNewsRepository::with_articles([
            article("Older", 5),
            article("Newest", 0),
            article("Middle", 2),
        ]);

        let (page, total) = repo
            .list_published(&NewsFilter::default(), Pagination::new(1, 2))
            .await
            .unwrap();

        assert_eq!(total, 3);
        let titles: Vec<&str> = page.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["Newest", "Middle"]);
    }

    #[tokio::test]
    async fn test_concurrent_views_are_all_counted() {
        let published = article("Launch", 0);
        let id = published.id;
        let repo = InMemoryNewsRepository::with_articles([published]);

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.record_view(id).await.unwrap() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(repo.record_view(id).await.unwrap().unwrap().views, 26);
    }
}
