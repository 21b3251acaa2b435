//! Catalog Service - read paths with degraded-mode fallback, plus reviews

use futures::FutureExt;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::fallback::InMemoryCatalogRepository;
use crate::filter::{
    DirectoryQuery, ListingQuery, MAX_PAGE_SIZE, Pagination, ProductFilter, ProductQuery,
    SortOrder, parse_limit,
};
use crate::models::{
    CatalogProduct, Category, CategoryListing, FilterFacets, Manufacturer,
    ManufacturerDirectory, ManufacturerInfo, ManufacturerListing, NewReview, ProductDetail,
    ProductList, ProductListing, Ratings, ReviewOutcome, SaltInfo, SearchResults,
};
use crate::repository::{CatalogRepository, Page};
use crate::search::{QUICK_SEARCH_FIELDS, SearchTerm, merged_search};
use crate::source::{FallbackPolicy, SourceSelector, Sourced};

pub const RELATED_PRODUCTS_LIMIT: usize = 6;
pub const SEARCH_LIMIT: u64 = 10;
pub const FEATURED_LIMIT: u64 = 8;
pub const QUICK_SEARCH_LIMIT: usize = 20;

async fn listing_with_facets(
    repo: &dyn CatalogRepository,
    filter: &ProductFilter,
    sort: SortOrder,
    pagination: Pagination,
) -> CatalogResult<(Page<CatalogProduct>, FilterFacets)> {
    let page = repo.find_products(filter, sort, pagination).await?;
    let facets = repo.facets().await?;
    Ok((page, facets))
}

async fn active_product_with_related(
    repo: &dyn CatalogRepository,
    id: Uuid,
) -> CatalogResult<Option<(CatalogProduct, Vec<CatalogProduct>)>> {
    let Some(product) = repo.get_product(id).await?.filter(|p| p.is_active) else {
        return Ok(None);
    };
    let related = repo
        .related_products(&product, RELATED_PRODUCTS_LIMIT)
        .await?;
    Ok(Some((product, related)))
}

async fn category_page(
    repo: &dyn CatalogRepository,
    id: Uuid,
    sort: SortOrder,
    pagination: Pagination,
) -> CatalogResult<Option<(Category, Page<CatalogProduct>)>> {
    let Some(category) = repo.get_category(id).await?.filter(|c| c.is_active) else {
        return Ok(None);
    };
    let page = repo
        .find_products(&ProductFilter::for_category(id), sort, pagination)
        .await?;
    Ok(Some((category, page)))
}

async fn manufacturer_page(
    repo: &dyn CatalogRepository,
    id: Uuid,
    sort: SortOrder,
    pagination: Pagination,
) -> CatalogResult<Option<(Manufacturer, Page<CatalogProduct>)>> {
    let Some(manufacturer) = repo.get_manufacturer(id).await?.filter(|m| m.is_active) else {
        return Ok(None);
    };
    let page = repo
        .find_products(&ProductFilter::for_manufacturer(id), sort, pagination)
        .await?;
    Ok(Some((manufacturer, page)))
}

async fn active_manufacturer(
    repo: &dyn CatalogRepository,
    id: Uuid,
) -> CatalogResult<Option<Manufacturer>> {
    Ok(repo.get_manufacturer(id).await?.filter(|m| m.is_active))
}

async fn manufacturer_with_products(
    repo: &dyn CatalogRepository,
    name: &str,
) -> CatalogResult<Option<(Manufacturer, Vec<CatalogProduct>)>> {
    let Some(manufacturer) = repo.find_manufacturer_by_name(name).await? else {
        return Ok(None);
    };
    let page = repo
        .find_products(
            &ProductFilter::for_manufacturer(manufacturer.id),
            SortOrder::default(),
            Pagination::new(1, MAX_PAGE_SIZE),
        )
        .await?;
    Ok(Some((manufacturer, page.items)))
}

/// Catalogue operations.
///
/// Reads go through a [`SourceSelector`] and come back tagged with the
/// backend that answered. Reviews are written to the live store only.
pub struct CatalogService<R: CatalogRepository> {
    selector: SourceSelector<R>,
}

impl<R: CatalogRepository> CatalogService<R> {
    /// Service over `store`, falling back to the bundled dataset.
    pub fn new(store: R) -> Self {
        Self::with_fallback(store, InMemoryCatalogRepository::with_fallback_dataset())
    }

    pub fn with_fallback(store: R, fallback: InMemoryCatalogRepository) -> Self {
        Self {
            selector: SourceSelector::new(Arc::new(store), Arc::new(fallback)),
        }
    }

    pub fn database_connected(&self) -> bool {
        self.selector.database_connected()
    }

    /// Filtered, sorted page of active products with the filter facets
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> CatalogResult<Sourced<ProductListing>> {
        let parsed = query.parse()?;
        let filter = &parsed.filter;
        let (sort, pagination) = (parsed.sort, parsed.pagination);

        let result = self
            .selector
            .select("list_products", FallbackPolicy::OnFailure, move |repo| {
                listing_with_facets(repo, filter, sort, pagination).boxed()
            })
            .await?;

        Ok(result.map(|(page, filters)| ProductListing {
            products: page.items,
            pagination: pagination.page_info(page.total),
            filters,
        }))
    }

    /// Active product plus up to six others from its category
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> CatalogResult<Sourced<ProductDetail>> {
        let result = self
            .selector
            .select("get_product", FallbackPolicy::OnFailure, move |repo| {
                active_product_with_related(repo, id).boxed()
            })
            .await?
            .ok_or(CatalogError::ProductNotFound)?;

        Ok(result.map(|(product, related_products)| ProductDetail {
            product,
            related_products,
        }))
    }

    /// Text search supplemented by name matching
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        q: Option<&str>,
        limit: &Option<String>,
    ) -> CatalogResult<Sourced<SearchResults>> {
        let term = SearchTerm::parse(q)?;
        let term = &term;
        let limit = parse_limit(limit, SEARCH_LIMIT);

        let result = self
            .selector
            .select(
                "search_products",
                FallbackPolicy::OnFailureOrEmpty,
                move |repo| merged_search(repo, term, limit).boxed(),
            )
            .await?;

        Ok(result.map(|merged| SearchResults {
            products: merged.items,
            total_results: merged.total as u64,
        }))
    }

    #[instrument(skip(self))]
    pub async fn products_by_category(
        &self,
        id: Uuid,
        query: &ListingQuery,
    ) -> CatalogResult<Sourced<CategoryListing>> {
        let (sort, pagination) = (query.sort(), query.pagination());

        let result = self
            .selector
            .select("products_by_category", FallbackPolicy::OnFailure, move |repo| {
                category_page(repo, id, sort, pagination).boxed()
            })
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;

        Ok(result.map(|(category, page)| CategoryListing {
            products: page.items,
            category,
            pagination: pagination.page_info(page.total),
        }))
    }

    #[instrument(skip(self))]
    pub async fn products_by_manufacturer(
        &self,
        id: Uuid,
        query: &ListingQuery,
    ) -> CatalogResult<Sourced<ManufacturerListing>> {
        let (sort, pagination) = (query.sort(), query.pagination());

        let result = self
            .selector
            .select(
                "products_by_manufacturer",
                FallbackPolicy::OnFailure,
                move |repo| manufacturer_page(repo, id, sort, pagination).boxed(),
            )
            .await?
            .ok_or(CatalogError::ManufacturerNotFound)?;

        Ok(result.map(|(manufacturer, page)| ManufacturerListing {
            products: page.items,
            manufacturer,
            pagination: pagination.page_info(page.total),
        }))
    }

    #[instrument(skip(self))]
    pub async fn featured_products(
        &self,
        limit: &Option<String>,
    ) -> CatalogResult<Sourced<ProductList>> {
        let limit = parse_limit(limit, FEATURED_LIMIT);

        let result = self
            .selector
            .select("featured_products", FallbackPolicy::OnFailure, move |repo| {
                repo.featured_products(limit)
            })
            .await?;

        Ok(result.map(|products| ProductList { products }))
    }

    /// Append a review and recompute the product's ratings.
    ///
    /// Store only: a degraded service refuses writes with
    /// [`CatalogError::StoreUnavailable`].
    #[instrument(skip(self, input))]
    pub async fn add_review(
        &self,
        id: Uuid,
        user: Uuid,
        input: NewReview,
    ) -> CatalogResult<ReviewOutcome> {
        let store = self.selector.store();
        if !store.is_available() {
            return Err(CatalogError::StoreUnavailable);
        }

        let product = store
            .get_product(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or(CatalogError::ProductNotFound)?;
        if product.has_reviewer(user) {
            return Err(CatalogError::DuplicateReview);
        }

        let review = input.into_review(user);
        let mut reviews = product.reviews;
        let expected_count = reviews.len() as u32;
        reviews.push(review.clone());
        let ratings = Ratings::from_reviews(&reviews);

        if store
            .append_review(id, &review, &ratings, expected_count)
            .await?
        {
            tracing::info!(product_id = %id, average = ratings.average, "Review added");
            return Ok(ReviewOutcome { review, ratings });
        }

        // The guard failed; work out which condition changed underneath us.
        match store.get_product(id).await?.filter(|p| p.is_active) {
            None => Err(CatalogError::ProductNotFound),
            Some(current) if current.has_reviewer(user) => Err(CatalogError::DuplicateReview),
            Some(_) => {
                tracing::warn!(product_id = %id, "Review lost a concurrent update");
                Err(CatalogError::ConcurrentModification)
            }
        }
    }

    /// Degraded-mode search by name, brand, generic, manufacturer and category
    #[instrument(skip(self))]
    pub async fn quick_search(
        &self,
        q: Option<&str>,
    ) -> CatalogResult<Sourced<Vec<CatalogProduct>>> {
        let term = SearchTerm::parse(q)?;
        let term = &term;

        self.selector
            .select("quick_search", FallbackPolicy::OnFailureOrEmpty, move |repo| {
                repo.field_search(term, &QUICK_SEARCH_FIELDS, Some(QUICK_SEARCH_LIMIT))
            })
            .await
    }

    /// Every active product carrying exactly this generic name, ignoring case
    #[instrument(skip(self))]
    pub async fn salt_lookup(&self, name: &str) -> CatalogResult<Sourced<SaltInfo>> {
        let result = self
            .selector
            .select("salt_lookup", FallbackPolicy::OnFailureOrEmpty, move |repo| {
                repo.find_by_generic_name(name)
            })
            .await?;

        result
            .map(SaltInfo::from_products)
            .ok_or(CatalogError::SaltNotFound(name.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn manufacturer_lookup(
        &self,
        name: &str,
    ) -> CatalogResult<Sourced<ManufacturerInfo>> {
        let result = self
            .selector
            .select(
                "manufacturer_lookup",
                FallbackPolicy::OnFailureOrEmpty,
                move |repo| manufacturer_with_products(repo, name).boxed(),
            )
            .await?
            .ok_or(CatalogError::ManufacturerNameNotFound(name.to_string()))?;

        Ok(result.map(|(manufacturer, products)| ManufacturerInfo {
            manufacturer,
            products,
        }))
    }

    #[instrument(skip(self))]
    pub async fn list_manufacturers(
        &self,
        query: &DirectoryQuery,
    ) -> CatalogResult<Sourced<ManufacturerDirectory>> {
        let pagination = query.pagination();
        let search = query.search();
        let search = &search;

        let result = self
            .selector
            .select("list_manufacturers", FallbackPolicy::OnFailure, move |repo| {
                repo.list_manufacturers(search.clone(), pagination)
            })
            .await?;

        Ok(result.map(|page| ManufacturerDirectory {
            manufacturers: page.items,
            pagination: pagination.page_info(page.total),
        }))
    }

    #[instrument(skip(self))]
    pub async fn get_manufacturer(&self, id: Uuid) -> CatalogResult<Sourced<Manufacturer>> {
        self.selector
            .select("get_manufacturer", FallbackPolicy::OnFailure, move |repo| {
                active_manufacturer(repo, id).boxed()
            })
            .await?
            .ok_or(CatalogError::ManufacturerNotFound)
    }

    /// Active categories by sort order, then name
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> CatalogResult<Sourced<Vec<Category>>> {
        self.selector
            .select("list_categories", FallbackPolicy::OnFailure, move |repo| {
                repo.list_categories()
            })
            .await
    }
}
