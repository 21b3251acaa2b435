//! MongoDB implementation of NewsRepository

use async_trait::async_trait;
use database::mongodb::uuid_to_bson;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::NewsResult;
use crate::models::{Article, NewsFilter, NewsStatus, NewsSummary, Pagination};
use crate::repository::NewsRepository;

fn published_filter(filter: &NewsFilter) -> Document {
    let mut document = doc! { "status": NewsStatus::Published.to_string() };
    if let Some(category) = filter.category {
        document.insert("category", category.to_string());
    }
    if filter.featured_only {
        document.insert("isFeatured", true);
    }
    document
}

/// MongoDB implementation of the NewsRepository
pub struct MongoNewsRepository {
    articles: Collection<Article>,
}

impl MongoNewsRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            articles: db.collection::<Article>("news"),
        }
    }

    /// Initialize indexes for the published listing
    pub async fn init_indexes(&self) -> NewsResult<()> {
        let index = |keys: Document, name: &str| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build()
        };

        let unique_slug = IndexModel::builder()
            .keys(doc! { "slug": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_news_slug_unique".to_string())
                    .build(),
            )
            .build();

        self.articles
            .create_indexes(vec![
                index(doc! { "status": 1, "publishedAt": -1 }, "idx_news_published"),
                index(doc! { "category": 1 }, "idx_news_category"),
                index(doc! { "isFeatured": 1 }, "idx_news_featured"),
                index(doc! { "tags": 1 }, "idx_news_tags"),
                unique_slug,
            ])
            .await?;

        tracing::info!("News indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl NewsRepository for MongoNewsRepository {
    #[instrument(skip(self))]
    async fn list_published(
        &self,
        filter: &NewsFilter,
        pagination: Pagination,
    ) -> NewsResult<(Vec<NewsSummary>, u64)> {
        let filter = published_filter(filter);
        let total = self.articles.count_documents(filter.clone()).await?;

        let options = FindOptions::builder()
            .projection(doc! { "content": 0 })
            .sort(doc! { "publishedAt": -1, "_id": -1 })
            .skip(pagination.skip())
            .limit(pagination.limit as i64)
            .build();
        let news: Vec<NewsSummary> = self
            .articles
            .clone_with_type::<NewsSummary>()
            .find(filter)
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        Ok((news, total))
    }

    #[instrument(skip(self))]
    async fn record_view(&self, id: Uuid) -> NewsResult<Option<Article>> {
        let article = self
            .articles
            .find_one_and_update(
                doc! { "_id": uuid_to_bson(id), "status": NewsStatus::Published.to_string() },
                doc! { "$inc": { "views": 1_i64 } },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(article)
    }

    #[instrument(skip(self, article), fields(article_id = %article.id))]
    async fn insert_article(&self, article: &Article) -> NewsResult<()> {
        self.articles.insert_one(article).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewsCategory;
    use chrono::Utc;
    use test_utils::{TestDataBuilder, TestMongo};

    #[test]
    fn test_listing_filter_document() {
        let filter = NewsFilter {
            category: Some(NewsCategory::HealthTips),
            featured_only: true,
        };
        assert_eq!(
            published_filter(&filter),
            doc! { "status": "published", "category": "health-tips", "isFeatured": true }
        );
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_views_count_only_published() {
        let mongo = TestMongo::new().await;
        let builder = TestDataBuilder::from_test_name("news_views");
        let repo = MongoNewsRepository::new(&mongo.database("news_test"));
        repo.init_indexes().await.unwrap();

        let published = Article::draft(
            "Monsoon health tips",
            "Stay safe this season",
            "Drink boiled water.",
            NewsCategory::HealthTips,
            builder.user_id(),
        )
        .published_at(Utc::now());
        let draft = Article::draft(
            "Unreleased",
            "Not yet",
            "Draft body",
            NewsCategory::Events,
            builder.user_id(),
        );
        repo.insert_article(&published).await.unwrap();
        repo.insert_article(&draft).await.unwrap();

        let viewed = repo.record_view(published.id).await.unwrap().unwrap();
        assert_eq!(viewed.views, 1);
        assert!(repo.record_view(draft.id).await.unwrap().is_none());

        let (news, total) = repo
            .list_published(&NewsFilter::default(), Pagination::new(1, 10))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(news[0].title, "Monsoon health tips");
    }
}
