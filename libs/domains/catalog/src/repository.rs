use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::filter::{Pagination, ProductFilter, SortOrder};
use crate::models::{CatalogProduct, Category, FilterFacets, Manufacturer, Ratings, Review};
use crate::search::{MatchField, SearchTerm};

/// One page of records plus the number of records matching overall
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Read access to the catalogue, plus the single review write.
///
/// Implemented by the MongoDB repository and by the in-memory fallback
/// dataset. Product reads return records already resolved into
/// [`CatalogProduct`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Whether the backing store is reachable right now.
    ///
    /// Reads a flag maintained elsewhere; never probes the store.
    fn is_available(&self) -> bool;

    /// Filtered, sorted page of products
    async fn find_products(
        &self,
        filter: &ProductFilter,
        sort: SortOrder,
        pagination: Pagination,
    ) -> CatalogResult<Page<CatalogProduct>>;

    /// Price range and enum values across all active products
    async fn facets(&self) -> CatalogResult<FilterFacets>;

    /// Product by id, active or not
    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<CatalogProduct>>;

    /// Active products of the same category, excluding `product` itself
    async fn related_products(
        &self,
        product: &CatalogProduct,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogProduct>>;

    /// Primary strategy: active products ranked by text relevance
    async fn text_search(
        &self,
        term: &SearchTerm,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogProduct>>;

    /// Alternative strategy: active products where any of `fields` contains
    /// the term, ignoring case. `None` means no limit.
    async fn field_search(
        &self,
        term: &SearchTerm,
        fields: &[MatchField],
        limit: Option<usize>,
    ) -> CatalogResult<Vec<CatalogProduct>>;

    /// Active products whose generic name equals `name`, ignoring case
    async fn find_by_generic_name(&self, name: &str) -> CatalogResult<Vec<CatalogProduct>>;

    /// Top-rated or promoted active products, best rated first
    async fn featured_products(&self, limit: usize) -> CatalogResult<Vec<CatalogProduct>>;

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>>;

    /// Active categories by `sortOrder`, then name
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    async fn get_manufacturer(&self, id: Uuid) -> CatalogResult<Option<Manufacturer>>;

    /// Active manufacturer whose name or company name equals `name`,
    /// ignoring case
    async fn find_manufacturer_by_name(&self, name: &str) -> CatalogResult<Option<Manufacturer>>;

    /// Active manufacturers by name, optionally narrowed by a text query
    async fn list_manufacturers(
        &self,
        search: Option<SearchTerm>,
        pagination: Pagination,
    ) -> CatalogResult<Page<Manufacturer>>;

    /// Append `review` and store `ratings`, provided the product still has
    /// `expected_count` reviews and none from the same user.
    ///
    /// Returns `false` when the guard did not match.
    async fn append_review(
        &self,
        product_id: Uuid,
        review: &Review,
        ratings: &Ratings,
        expected_count: u32,
    ) -> CatalogResult<bool>;
}
