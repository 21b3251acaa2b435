//! MongoDB implementation of CatalogRepository

use async_trait::async_trait;
use database::ConnectionStatus;
use database::mongodb::{to_stored_bson, uuid_to_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, from_document},
    error::ErrorKind,
    options::{FindOptions, IndexOptions},
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::instrument;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::filter::{Pagination, ProductFilter, SortOrder};
use crate::models::{
    CatalogProduct, Category, CategorySummary, DosageForm, FEATURED_MIN_RATING, FEATURED_TAGS,
    FilterFacets, Manufacturer, ManufacturerSummary, Product, Ratings, Review, StockStatus,
};
use crate::repository::{CatalogRepository, Page};
use crate::search::{MatchField, SearchTerm};

/// Server error code for a `$text` query without a text index
const INDEX_NOT_FOUND: i32 = 27;

fn is_missing_text_index(err: &mongodb::error::Error) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(command) if command.code == INDEX_NOT_FOUND)
}

fn ids_in(ids: impl IntoIterator<Item = Uuid>) -> Document {
    let ids: Vec<Bson> = ids.into_iter().map(uuid_to_bson).collect();
    doc! { "$in": ids }
}

fn case_insensitive(pattern: String) -> Document {
    doc! { "$regex": pattern, "$options": "i" }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacetRow {
    min_price: f64,
    max_price: f64,
    dosage_forms: Vec<DosageForm>,
    stock_statuses: Vec<StockStatus>,
}

/// MongoDB implementation of the CatalogRepository
pub struct MongoCatalogRepository {
    products: Collection<Product>,
    categories: Collection<Category>,
    manufacturers: Collection<Manufacturer>,
    status: ConnectionStatus,
}

impl MongoCatalogRepository {
    /// `status` is the shared liveness flag; it is read, never written here.
    pub fn new(db: &Database, status: ConnectionStatus) -> Self {
        Self {
            products: db.collection::<Product>("products"),
            categories: db.collection::<Category>("categories"),
            manufacturers: db.collection::<Manufacturer>("manufacturers"),
            status,
        }
    }

    /// Initialize indexes for the catalogue queries
    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let product_indexes = vec![
            // Primary search strategy
            IndexModel::builder()
                .keys(doc! {
                    "name": "text",
                    "genericName": "text",
                    "brandName": "text",
                    "description": "text",
                    "composition": "text",
                })
                .options(
                    IndexOptions::builder()
                        .name("idx_product_text".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "isActive": 1, "createdAt": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_active_created".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1, "isActive": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "manufacturer": 1, "isActive": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_manufacturer".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "price.distributorPrice": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_distributor_price".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "genericName": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_generic_name".to_string())
                        .build(),
                )
                .build(),
        ];
        self.products.create_indexes(product_indexes).await?;

        let manufacturer_text = IndexModel::builder()
            .keys(doc! { "name": "text", "companyName": "text", "description": "text" })
            .options(
                IndexOptions::builder()
                    .name("idx_manufacturer_text".to_string())
                    .build(),
            )
            .build();
        self.manufacturers.create_index(manufacturer_text).await?;

        let category_order = IndexModel::builder()
            .keys(doc! { "isActive": 1, "sortOrder": 1 })
            .options(
                IndexOptions::builder()
                    .name("idx_category_order".to_string())
                    .build(),
            )
            .build();
        self.categories.create_index(category_order).await?;

        tracing::info!("Catalog indexes created successfully");
        Ok(())
    }

    /// Resolve category and manufacturer references with one lookup each.
    async fn populate(&self, products: Vec<Product>) -> CatalogResult<Vec<CatalogProduct>> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let category_ids: HashSet<Uuid> = products.iter().map(|p| p.category).collect();
        let manufacturer_ids: HashSet<Uuid> = products.iter().map(|p| p.manufacturer).collect();

        let categories: HashMap<Uuid, CategorySummary> = self
            .categories
            .find(doc! { "_id": ids_in(category_ids) })
            .await?
            .try_collect::<Vec<_>>()
            .await?
            .iter()
            .map(|c| (c.id, CategorySummary::from(c)))
            .collect();
        let manufacturers: HashMap<Uuid, ManufacturerSummary> = self
            .manufacturers
            .find(doc! { "_id": ids_in(manufacturer_ids) })
            .await?
            .try_collect::<Vec<_>>()
            .await?
            .iter()
            .map(|m| (m.id, ManufacturerSummary::from(m)))
            .collect();

        Ok(products
            .into_iter()
            .map(|product| {
                let category = categories
                    .get(&product.category)
                    .cloned()
                    .unwrap_or_else(|| CategorySummary::unknown(product.category));
                let manufacturer = manufacturers
                    .get(&product.manufacturer)
                    .cloned()
                    .unwrap_or_else(|| ManufacturerSummary::unknown(product.manufacturer));
                CatalogProduct::from_product(product, category, manufacturer)
            })
            .collect())
    }

    async fn find_populated(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> CatalogResult<Vec<CatalogProduct>> {
        let products: Vec<Product> = self
            .products
            .find(filter)
            .with_options(options)
            .await?
            .try_collect()
            .await?;
        self.populate(products).await
    }

    /// Ids of active reference records whose name contains `term`.
    async fn reference_ids<T>(
        collection: &Collection<T>,
        term: &SearchTerm,
    ) -> CatalogResult<Vec<Uuid>>
    where
        T: Send + Sync,
    {
        #[derive(Deserialize)]
        struct IdOnly {
            #[serde(rename = "_id")]
            id: Uuid,
        }

        let filter = doc! {
            "isActive": true,
            "name": case_insensitive(term.contains_pattern()),
        };
        let ids: Vec<IdOnly> = collection
            .clone_with_type::<IdOnly>()
            .find(filter)
            .projection(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(ids.into_iter().map(|r| r.id).collect())
    }
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    fn is_available(&self) -> bool {
        self.status.is_connected()
    }

    #[instrument(skip(self))]
    async fn find_products(
        &self,
        filter: &ProductFilter,
        sort: SortOrder,
        pagination: Pagination,
    ) -> CatalogResult<Page<CatalogProduct>> {
        let mongo_filter = filter.to_document();

        let total = self.products.count_documents(mongo_filter.clone()).await?;
        if total == 0 {
            return Ok(Page::empty());
        }

        let options = FindOptions::builder()
            .sort(sort.to_document())
            .skip(pagination.skip())
            .limit(pagination.limit as i64)
            .build();
        let items = self.find_populated(mongo_filter, options).await?;

        Ok(Page { items, total })
    }

    #[instrument(skip(self))]
    async fn facets(&self) -> CatalogResult<FilterFacets> {
        let pipeline = vec![
            doc! { "$match": { "isActive": true } },
            doc! {
                "$group": {
                    "_id": Bson::Null,
                    "minPrice": { "$min": "$price.distributorPrice" },
                    "maxPrice": { "$max": "$price.distributorPrice" },
                    "dosageForms": { "$addToSet": "$dosageForm" },
                    "stockStatuses": { "$addToSet": "$stockStatus" },
                }
            },
        ];

        let mut cursor = self.products.aggregate(pipeline).await?;
        let Some(row) = cursor.try_next().await? else {
            return Ok(FilterFacets::default());
        };
        let mut row: FacetRow = from_document(row)?;
        row.dosage_forms.sort();
        row.stock_statuses.sort();

        Ok(FilterFacets {
            min_price: row.min_price,
            max_price: row.max_price,
            dosage_forms: row.dosage_forms,
            stock_statuses: row.stock_statuses,
        })
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<CatalogProduct>> {
        let Some(product) = self.products.find_one(doc! { "_id": uuid_to_bson(id) }).await? else {
            return Ok(None);
        };
        Ok(self.populate(vec![product]).await?.pop())
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn related_products(
        &self,
        product: &CatalogProduct,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogProduct>> {
        let filter = doc! {
            "isActive": true,
            "category": uuid_to_bson(product.category.id),
            "_id": { "$ne": uuid_to_bson(product.id) },
        };
        let options = FindOptions::builder()
            .sort(SortOrder::default().to_document())
            .limit(limit as i64)
            .build();
        self.find_populated(filter, options).await
    }

    #[instrument(skip(self), fields(term = %term))]
    async fn text_search(
        &self,
        term: &SearchTerm,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogProduct>> {
        let filter = doc! {
            "$text": { "$search": term.as_str() },
            "isActive": true,
        };
        let options = FindOptions::builder()
            .sort(doc! { "score": { "$meta": "textScore" } })
            .limit(limit as i64)
            .build();

        let cursor = match self.products.find(filter).with_options(options).await {
            Ok(cursor) => cursor,
            Err(err) if is_missing_text_index(&err) => {
                tracing::warn!("Product text index missing, primary search skipped");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        let products: Vec<Product> = cursor.try_collect().await?;
        self.populate(products).await
    }

    #[instrument(skip(self), fields(term = %term))]
    async fn field_search(
        &self,
        term: &SearchTerm,
        fields: &[MatchField],
        limit: Option<usize>,
    ) -> CatalogResult<Vec<CatalogProduct>> {
        let mut alternatives: Vec<Document> = Vec::new();

        for field in fields {
            match (field, field.path()) {
                (_, Some(path)) => {
                    let mut clause = Document::new();
                    clause.insert(path, case_insensitive(term.contains_pattern()));
                    alternatives.push(clause);
                }
                (MatchField::ManufacturerName, None) => {
                    let ids = Self::reference_ids(&self.manufacturers, term).await?;
                    if !ids.is_empty() {
                        alternatives.push(doc! { "manufacturer": ids_in(ids) });
                    }
                }
                (MatchField::CategoryName, None) => {
                    let ids = Self::reference_ids(&self.categories, term).await?;
                    if !ids.is_empty() {
                        alternatives.push(doc! { "category": ids_in(ids) });
                    }
                }
                (_, None) => {}
            }
        }

        if alternatives.is_empty() {
            return Ok(Vec::new());
        }

        let filter = doc! { "isActive": true, "$or": alternatives };
        let mut options = FindOptions::builder()
            .sort(SortOrder::default().to_document())
            .build();
        options.limit = limit.map(|l| l as i64);
        self.find_populated(filter, options).await
    }

    #[instrument(skip(self))]
    async fn find_by_generic_name(&self, name: &str) -> CatalogResult<Vec<CatalogProduct>> {
        let Some(term) = SearchTerm::new(name) else {
            return Ok(Vec::new());
        };
        let filter = doc! {
            "isActive": true,
            "genericName": case_insensitive(term.exact_pattern()),
        };
        let options = FindOptions::builder()
            .sort(doc! { "name": 1, "_id": 1 })
            .build();
        self.find_populated(filter, options).await
    }

    #[instrument(skip(self))]
    async fn featured_products(&self, limit: usize) -> CatalogResult<Vec<CatalogProduct>> {
        let filter = doc! {
            "isActive": true,
            "$or": [
                { "ratings.average": { "$gte": FEATURED_MIN_RATING } },
                { "tags": { "$in": FEATURED_TAGS.to_vec() } },
            ],
        };
        let options = FindOptions::builder()
            .sort(doc! { "ratings.average": -1, "createdAt": -1 })
            .limit(limit as i64)
            .build();
        self.find_populated(filter, options).await
    }

    #[instrument(skip(self))]
    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        let category = self
            .categories
            .find_one(doc! { "_id": uuid_to_bson(id) })
            .await?;
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let categories = self
            .categories
            .find(doc! { "isActive": true })
            .sort(doc! { "sortOrder": 1, "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn get_manufacturer(&self, id: Uuid) -> CatalogResult<Option<Manufacturer>> {
        let manufacturer = self
            .manufacturers
            .find_one(doc! { "_id": uuid_to_bson(id) })
            .await?;
        Ok(manufacturer)
    }

    #[instrument(skip(self))]
    async fn find_manufacturer_by_name(&self, name: &str) -> CatalogResult<Option<Manufacturer>> {
        let Some(term) = SearchTerm::new(name) else {
            return Ok(None);
        };
        let filter = doc! {
            "isActive": true,
            "$or": [
                { "name": case_insensitive(term.exact_pattern()) },
                { "companyName": case_insensitive(term.exact_pattern()) },
            ],
        };
        let manufacturer = self.manufacturers.find_one(filter).await?;
        Ok(manufacturer)
    }

    #[instrument(skip(self))]
    async fn list_manufacturers(
        &self,
        search: Option<SearchTerm>,
        pagination: Pagination,
    ) -> CatalogResult<Page<Manufacturer>> {
        let mut filter = doc! { "isActive": true };
        if let Some(term) = &search {
            filter.insert("$text", doc! { "$search": term.as_str() });
        }

        let total = self.manufacturers.count_documents(filter.clone()).await?;
        let items = self
            .manufacturers
            .find(filter)
            .sort(doc! { "name": 1, "_id": 1 })
            .skip(pagination.skip())
            .limit(pagination.limit as i64)
            .await?
            .try_collect()
            .await?;

        Ok(Page { items, total })
    }

    #[instrument(skip(self, review, ratings), fields(user = %review.user))]
    async fn append_review(
        &self,
        product_id: Uuid,
        review: &Review,
        ratings: &Ratings,
        expected_count: u32,
    ) -> CatalogResult<bool> {
        let filter = doc! {
            "_id": uuid_to_bson(product_id),
            "isActive": true,
            "reviews.user": { "$ne": uuid_to_bson(review.user) },
            "reviews": { "$size": i64::from(expected_count) },
        };
        let update = doc! {
            "$push": { "reviews": to_stored_bson(review)? },
            "$set": {
                "ratings": to_stored_bson(ratings)?,
                "updatedAt": to_stored_bson(&chrono::Utc::now())?,
            },
        };

        let result = self.products.update_one(filter, update).await?;
        if result.modified_count == 1 {
            tracing::info!(product_id = %product_id, "Review appended");
        }
        Ok(result.modified_count == 1)
    }
}
