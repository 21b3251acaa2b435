use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{NewsError, NewsResult};

pub const NEWS_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
const WORDS_PER_MINUTE: usize = 200;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NewsCategory {
    CompanyNews,
    ProductLaunch,
    IndustryUpdates,
    HealthTips,
    RegulatoryUpdates,
    Events,
    Partnerships,
    Awards,
    Research,
    Sustainability,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NewsStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// Lowercase ASCII alphanumerics joined by single hyphens.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Minutes to read `content` at 200 words per minute, rounded up.
pub fn reading_time(content: &str) -> u32 {
    content.split_whitespace().count().div_ceil(WORDS_PER_MINUTE) as u32
}

/// Article as stored in the `news` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    /// Author reference
    pub author: Uuid,
    pub category: NewsCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<NewsImage>,
    #[serde(default)]
    pub status: NewsStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub related_articles: Vec<Uuid>,
    /// Minutes
    #[serde(default)]
    pub reading_time: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// A draft with its slug and reading time derived.
    pub fn draft(
        title: impl Into<String>,
        excerpt: impl Into<String>,
        content: impl Into<String>,
        category: NewsCategory,
        author: Uuid,
    ) -> Self {
        let title = title.into();
        let content = content.into();
        let now = Utc::now();

        Self {
            id: Uuid::now_v7(),
            slug: slugify(&title),
            reading_time: reading_time(&content),
            title,
            excerpt: excerpt.into(),
            content,
            author,
            category,
            tags: Vec::new(),
            featured_image: None,
            status: NewsStatus::Draft,
            published_at: None,
            is_featured: false,
            views: 0,
            likes: 0,
            shares: 0,
            related_articles: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.status = NewsStatus::Published;
        self.published_at = Some(at);
        self
    }

    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == NewsStatus::Published
    }
}

/// An article as listed: everything but the content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub author: Uuid,
    pub category: NewsCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<NewsImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub reading_time: u32,
}

impl From<&Article> for NewsSummary {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            slug: article.slug.clone(),
            excerpt: article.excerpt.clone(),
            author: article.author,
            category: article.category,
            tags: article.tags.clone(),
            featured_image: article.featured_image.clone(),
            published_at: article.published_at,
            is_featured: article.is_featured,
            views: article.views,
            reading_time: article.reading_time,
        }
    }
}

/// Query options of `GET /news`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NewsQuery {
    /// One of the ten news categories, e.g. `health-tips`
    pub category: Option<String>,
    /// `true` lists featured articles only
    pub featured: Option<String>,
    pub page: Option<String>,
    /// Page size (default 10, max 100)
    pub limit: Option<String>,
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_positive(raw: &Option<String>) -> Option<u64> {
    present(raw)?.parse::<u64>().ok().filter(|n| *n > 0)
}

impl NewsQuery {
    pub fn filter(&self) -> NewsResult<NewsFilter> {
        let category = present(&self.category)
            .map(|value| {
                NewsCategory::from_str(value)
                    .map_err(|_| NewsError::InvalidOption {
                        option: "category",
                        value: value.to_string(),
                    })
            })
            .transpose()?;

        Ok(NewsFilter {
            category,
            featured_only: present(&self.featured) == Some("true"),
        })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(
            parse_positive(&self.page).unwrap_or(1),
            parse_positive(&self.limit).unwrap_or(NEWS_PAGE_SIZE),
        )
    }
}

/// Published articles, optionally narrowed to a category or to featured ones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsFilter {
    pub category: Option<NewsCategory>,
    pub featured_only: bool,
}

impl NewsFilter {
    pub fn matches(&self, article: &Article) -> bool {
        article.is_published()
            && self.category.is_none_or(|c| article.category == c)
            && (!self.featured_only || article.is_featured)
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
pub struct NewsPageInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_articles: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl NewsPageInfo {
    pub fn new(pagination: Pagination, total: u64) -> Self {
        let total_pages = total.div_ceil(pagination.limit);
        Self {
            current_page: pagination.page,
            total_pages,
            total_articles: total,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

/// `GET /news` payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NewsListing {
    pub news: Vec<NewsSummary>,
    pub pagination: NewsPageInfo,
}

/// `GET /news/{id}` payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleView {
    pub news: Article,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article::draft(
            "Cold-Chain Logistics: 2026 Update!",
            "How vaccines reach rural pharmacies",
            "word ".repeat(401),
            NewsCategory::IndustryUpdates,
            Uuid::now_v7(),
        )
    }

    #[test]
    fn test_slug_and_reading_time() {
        let article = article();
        assert_eq!(article.slug, "cold-chain-logistics-2026-update");
        assert_eq!(article.reading_time, 3);
        assert_eq!(slugify("--Hello,   World--"), "hello-world");
        assert_eq!(reading_time(""), 0);
    }

    #[test]
    fn test_filter_requires_published() {
        let draft = article();
        assert!(!NewsFilter::default().matches(&draft));

        let published = draft.published_at(Utc::now());
        assert!(NewsFilter::default().matches(&published));

        let featured_only = NewsFilter {
            featured_only: true,
            ..Default::default()
        };
        assert!(!featured_only.matches(&published));
        assert!(featured_only.matches(&published.clone().featured()));
    }

    #[test]
    fn test_query_parsing() {
        let query = NewsQuery {
            category: Some("health-tips".into()),
            featured: Some("yes".into()),
            limit: Some("0".into()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.category, Some(NewsCategory::HealthTips));
        assert!(!filter.featured_only);
        assert_eq!(query.pagination(), Pagination::new(1, NEWS_PAGE_SIZE));

        let bad = NewsQuery {
            category: Some("gossip".into()),
            ..Default::default()
        };
        assert!(matches!(
            bad.filter(),
            Err(NewsError::InvalidOption { option: "category", .. })
        ));
    }

    #[test]
    fn test_summary_drops_content() {
        let summary = serde_json::to_value(NewsSummary::from(&article())).unwrap();
        assert!(summary.get("content").is_none());
        assert_eq!(summary["category"], "industry-updates");
    }
}
