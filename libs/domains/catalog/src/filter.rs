//! Filter Builder: turns raw query-string options into typed filter clauses,
//! a sort order and pagination.
//!
//! Malformed numbers fall back to defaults. Malformed identifiers and enum
//! values are rejected here so no call site has to check them again.

use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use database::mongodb::uuid_to_bson;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{CatalogProduct, DosageForm, StockStatus};
use crate::search::{SearchTerm, text_relevance};

pub const MAX_PAGE_SIZE: u64 = 100;
pub const PRODUCT_PAGE_SIZE: u64 = 12;
pub const LISTING_PAGE_SIZE: u64 = 10;
pub const DIRECTORY_PAGE_SIZE: u64 = 20;

/// Query options of `GET /products`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Page number, 1-based (default 1)
    pub page: Option<String>,
    /// Page size (default 12, max 100)
    pub limit: Option<String>,
    /// `[-]createdAt|name|price|rating` (default `-createdAt`)
    pub sort: Option<String>,
    /// Full-text query over the indexed product fields
    pub search: Option<String>,
    /// Category id
    pub category: Option<String>,
    /// Manufacturer id
    pub manufacturer: Option<String>,
    /// Lower bound on the distributor price
    pub min_price: Option<String>,
    /// Upper bound on the distributor price
    pub max_price: Option<String>,
    /// `true` selects prescription-only products, anything else the rest
    pub prescription_required: Option<String>,
    pub stock_status: Option<String>,
    pub dosage_form: Option<String>,
}

/// Output of [`ProductQuery::parse`]
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub filter: ProductFilter,
    pub sort: SortOrder,
    pub pagination: Pagination,
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_positive(raw: &Option<String>) -> Option<u64> {
    present(raw)?.parse::<u64>().ok().filter(|n| *n > 0)
}

fn parse_amount(raw: &Option<String>) -> Option<f64> {
    present(raw)?
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

fn parse_id(option: &'static str, raw: &Option<String>) -> CatalogResult<Option<Uuid>> {
    present(raw)
        .map(|value| Uuid::parse_str(value).map_err(|_| CatalogError::invalid_option(option, value)))
        .transpose()
}

fn parse_enum<T: FromStr>(option: &'static str, raw: &Option<String>) -> CatalogResult<Option<T>> {
    present(raw)
        .map(|value| T::from_str(value).map_err(|_| CatalogError::invalid_option(option, value)))
        .transpose()
}

impl ProductQuery {
    pub fn parse(&self) -> CatalogResult<ParsedQuery> {
        let mut filter = ProductFilter::active();

        if let Some(term) = present(&self.search).and_then(SearchTerm::new) {
            filter.push(FilterClause::Text(term));
        }
        if let Some(id) = parse_id("category", &self.category)? {
            filter.push(FilterClause::Category(id));
        }
        if let Some(id) = parse_id("manufacturer", &self.manufacturer)? {
            filter.push(FilterClause::Manufacturer(id));
        }

        let min = parse_amount(&self.min_price);
        let max = parse_amount(&self.max_price);
        if min.is_some() || max.is_some() {
            filter.push(FilterClause::PriceRange { min, max });
        }

        if let Some(flag) = present(&self.prescription_required) {
            filter.push(FilterClause::PrescriptionRequired(flag == "true"));
        }
        if let Some(status) = parse_enum::<StockStatus>("stockStatus", &self.stock_status)? {
            filter.push(FilterClause::StockStatus(status));
        }
        if let Some(form) = parse_enum::<DosageForm>("dosageForm", &self.dosage_form)? {
            filter.push(FilterClause::DosageForm(form));
        }

        Ok(ParsedQuery {
            filter,
            sort: SortOrder::parse(present(&self.sort)),
            pagination: Pagination::for_products(&self.page, &self.limit),
        })
    }
}

/// `page`, `limit` and `sort` of the per-category and per-manufacturer listings
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

impl ListingQuery {
    pub fn sort(&self) -> SortOrder {
        SortOrder::parse(present(&self.sort))
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::for_products(&self.page, &self.limit)
    }
}

/// Options of the manufacturer directory
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DirectoryQuery {
    /// Text query over name, company name and description
    pub search: Option<String>,
    pub page: Option<String>,
    /// Page size (default 20, max 100)
    pub limit: Option<String>,
}

impl DirectoryQuery {
    pub fn search(&self) -> Option<SearchTerm> {
        present(&self.search).and_then(SearchTerm::new)
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::for_directory(&self.page, &self.limit)
    }
}

/// A bare `limit` option, as taken by search and featured listings
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

/// `q` and `limit` of the search endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Search text, required
    pub q: Option<String>,
    pub limit: Option<String>,
}

/// One recognized filter option
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// Only active records. Always present, never a client option.
    Active,
    Text(SearchTerm),
    Category(Uuid),
    Manufacturer(Uuid),
    /// Inclusive bounds on the distributor price; a missing bound is open
    PriceRange { min: Option<f64>, max: Option<f64> },
    PrescriptionRequired(bool),
    StockStatus(StockStatus),
    DosageForm(DosageForm),
}

impl FilterClause {
    /// The clause as a MongoDB query fragment.
    pub fn to_document(&self) -> Document {
        match self {
            FilterClause::Active => doc! { "isActive": true },
            FilterClause::Text(term) => doc! { "$text": { "$search": term.as_str() } },
            FilterClause::Category(id) => doc! { "category": uuid_to_bson(*id) },
            FilterClause::Manufacturer(id) => doc! { "manufacturer": uuid_to_bson(*id) },
            FilterClause::PriceRange { min, max } => {
                let mut range = Document::new();
                if let Some(min) = min {
                    range.insert("$gte", *min);
                }
                if let Some(max) = max {
                    range.insert("$lte", *max);
                }
                doc! { "price.distributorPrice": range }
            }
            FilterClause::PrescriptionRequired(flag) => doc! { "prescriptionRequired": *flag },
            FilterClause::StockStatus(status) => doc! { "stockStatus": status.to_string() },
            FilterClause::DosageForm(form) => doc! { "dosageForm": form.to_string() },
        }
    }

    /// The clause evaluated against an in-memory record.
    pub fn matches(&self, product: &CatalogProduct) -> bool {
        match self {
            FilterClause::Active => product.is_active,
            FilterClause::Text(term) => text_relevance(product, term) > 0,
            FilterClause::Category(id) => product.category.id == *id,
            FilterClause::Manufacturer(id) => product.manufacturer.id == *id,
            FilterClause::PriceRange { min, max } => {
                let price = product.price.distributor_price;
                min.is_none_or(|min| price >= min) && max.is_none_or(|max| price <= max)
            }
            FilterClause::PrescriptionRequired(flag) => product.prescription_required == *flag,
            FilterClause::StockStatus(status) => product.stock_status == *status,
            FilterClause::DosageForm(form) => product.dosage_form == *form,
        }
    }
}

/// Conjunction of filter clauses
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    clauses: Vec<FilterClause>,
}

impl ProductFilter {
    /// The always-on `isActive` predicate alone.
    pub fn active() -> Self {
        Self {
            clauses: vec![FilterClause::Active],
        }
    }

    pub fn for_category(id: Uuid) -> Self {
        Self::active().with(FilterClause::Category(id))
    }

    pub fn for_manufacturer(id: Uuid) -> Self {
        Self::active().with(FilterClause::Manufacturer(id))
    }

    pub fn with(mut self, clause: FilterClause) -> Self {
        self.push(clause);
        self
    }

    fn push(&mut self, clause: FilterClause) {
        if clause != FilterClause::Active {
            self.clauses.push(clause);
        }
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        for (key, value) in self.clauses.iter().flat_map(FilterClause::to_document) {
            document.insert(key, value);
        }
        document
    }

    pub fn matches(&self, product: &CatalogProduct) -> bool {
        self.clauses.iter().all(|clause| clause.matches(product))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Name,
    /// Distributor price
    Price,
    /// Average rating
    Rating,
}

impl SortField {
    pub fn path(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Name => "name",
            SortField::Price => "price.distributorPrice",
            SortField::Rating => "ratings.average",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub descending: bool,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl SortOrder {
    /// `[-]field`; anything unrecognized yields `-createdAt`.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        let (descending, name) = match raw.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, raw),
        };
        let field = match name {
            "createdAt" => SortField::CreatedAt,
            "name" => SortField::Name,
            "price" => SortField::Price,
            "rating" => SortField::Rating,
            _ => return Self::default(),
        };
        Self { field, descending }
    }

    /// Sort document with `_id` as the tie-breaker so pages never overlap.
    pub fn to_document(&self) -> Document {
        let direction = if self.descending { -1 } else { 1 };
        let mut document = Document::new();
        document.insert(self.field.path(), direction);
        document.insert("_id", direction);
        document
    }

    pub fn compare(&self, a: &CatalogProduct, b: &CatalogProduct) -> Ordering {
        let ordering = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Price => a
                .price
                .distributor_price
                .total_cmp(&b.price.distributor_price),
            SortField::Rating => a.ratings.average.total_cmp(&b.ratings.average),
        }
        .then_with(|| a.id.cmp(&b.id));

        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Offset pagination with positive `page` and `limit`
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

    fn parse(page: &Option<String>, limit: &Option<String>, default_limit: u64) -> Self {
        Self::new(
            parse_positive(page).unwrap_or(1),
            parse_positive(limit).unwrap_or(default_limit),
        )
    }

    pub fn for_products(page: &Option<String>, limit: &Option<String>) -> Self {
        Self::parse(page, limit, PRODUCT_PAGE_SIZE)
    }

    pub fn for_listing(page: &Option<String>, limit: &Option<String>) -> Self {
        Self::parse(page, limit, LISTING_PAGE_SIZE)
    }

    pub fn for_directory(page: &Option<String>, limit: &Option<String>) -> Self {
        Self::parse(page, limit, DIRECTORY_PAGE_SIZE)
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Page metadata for `total` matching records.
    pub fn page_info(&self, total: u64) -> PageInfo {
        PageInfo::new(*self, total)
    }
}

/// Parse a bare `limit` option, falling back to `default`.
pub fn parse_limit(raw: &Option<String>, default: u64) -> usize {
    parse_positive(raw).unwrap_or(default).min(MAX_PAGE_SIZE) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(pagination: Pagination, total: u64) -> Self {
        let total_pages = total.div_ceil(pagination.limit);
        Self {
            current_page: pagination.page,
            total_pages,
            total,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}
