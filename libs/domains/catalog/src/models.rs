use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::filter::PageInfo;

/// Pharmaceutical dosage form
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DosageForm {
    Tablet,
    Capsule,
    Syrup,
    Injection,
    Ointment,
    Drops,
    Powder,
    Gel,
    Cream,
    Inhaler,
    Patch,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    LimitedStock,
    Discontinued,
}

/// Price points of a product. Amounts are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub mrp: f64,
    pub distributor_price: f64,
    pub retailer_price: f64,
}

impl Pricing {
    /// Distributor discount off the MRP, rounded to a whole percent.
    ///
    /// Zero when the MRP is zero or the distributor price exceeds it.
    pub fn discount_percentage(&self) -> i32 {
        if self.mrp <= 0.0 {
            return 0;
        }
        let percent = ((self.mrp - self.distributor_price) / self.mrp * 100.0).round();
        percent.max(0.0) as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Ratings {
    pub average: f64,
    pub count: u32,
}

impl Ratings {
    /// Mean rating over all reviews.
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }
        let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        Self {
            average: f64::from(sum) / reviews.len() as f64,
            count: reviews.len() as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user: Uuid,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /products/{id}/reviews`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewReview {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

impl NewReview {
    pub fn into_review(self, user: Uuid) -> Review {
        let comment = self
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Review {
            user,
            rating: self.rating,
            comment,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

fn default_min_order_quantity() -> u32 {
    1
}

fn default_gst_rate() -> f64 {
    12.0
}

fn default_true() -> bool {
    true
}

/// Product as stored in the `products` collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub generic_name: String,
    #[serde(default)]
    pub brand_name: Option<String>,
    pub description: String,
    pub composition: String,
    #[serde(default)]
    pub strength: Option<String>,
    #[serde(default)]
    pub pack_size: Option<String>,
    pub dosage_form: DosageForm,
    /// Category reference
    pub category: Uuid,
    /// Manufacturer reference
    pub manufacturer: Uuid,
    pub price: Pricing,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub prescription_required: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub ratings: Ratings,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default = "default_min_order_quantity")]
    pub min_order_quantity: u32,
    #[serde(default = "default_gst_rate")]
    pub gst_rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category as stored in the `categories` collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Manufacturer as stored in the `manufacturers` collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Manufacturer {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Manufacturer {
    /// Case-insensitive equality against `name` or `companyName`.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self
                .company_name
                .as_deref()
                .is_some_and(|company| company.eq_ignore_ascii_case(name))
    }
}

/// Category fields embedded in a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl CategorySummary {
    /// Stand-in for a reference whose category record is missing.
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            name: "Unknown".to_string(),
            icon: None,
        }
    }
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            icon: category.icon.clone(),
        }
    }
}

/// Manufacturer fields embedded in a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl ManufacturerSummary {
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            name: "Unknown".to_string(),
            company_name: None,
            logo: None,
        }
    }
}

impl From<&Manufacturer> for ManufacturerSummary {
    fn from(manufacturer: &Manufacturer) -> Self {
        Self {
            id: manufacturer.id,
            name: manufacturer.name.clone(),
            company_name: manufacturer.company_name.clone(),
            logo: manufacturer.logo.clone(),
        }
    }
}

/// The one record shape every catalog read produces.
///
/// The Mongo repository and the fallback dataset both resolve their
/// category and manufacturer references into this form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub generic_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    pub description: String,
    pub composition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_size: Option<String>,
    pub dosage_form: DosageForm,
    pub category: CategorySummary,
    pub manufacturer: ManufacturerSummary,
    pub price: Pricing,
    pub discount_percentage: i32,
    pub stock_status: StockStatus,
    pub prescription_required: bool,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub images: Vec<ProductImage>,
    pub ratings: Ratings,
    pub reviews: Vec<Review>,
    pub min_order_quantity: u32,
    pub gst_rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogProduct {
    pub fn from_product(
        product: Product,
        category: CategorySummary,
        manufacturer: ManufacturerSummary,
    ) -> Self {
        Self {
            discount_percentage: product.price.discount_percentage(),
            id: product.id,
            name: product.name,
            generic_name: product.generic_name,
            brand_name: product.brand_name,
            description: product.description,
            composition: product.composition,
            strength: product.strength,
            pack_size: product.pack_size,
            dosage_form: product.dosage_form,
            category,
            manufacturer,
            price: product.price,
            stock_status: product.stock_status,
            prescription_required: product.prescription_required,
            is_active: product.is_active,
            tags: product.tags,
            images: product.images,
            ratings: product.ratings,
            reviews: product.reviews,
            min_order_quantity: product.min_order_quantity,
            gst_rate: product.gst_rate,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }

    /// Brand shown to buyers: the brand name, else the product name.
    pub fn display_brand(&self) -> &str {
        self.brand_name.as_deref().unwrap_or(&self.name)
    }

    pub fn has_reviewer(&self, user: Uuid) -> bool {
        self.reviews.iter().any(|r| r.user == user)
    }

    /// Rated 4 or better, or carrying one of [`FEATURED_TAGS`].
    pub fn is_featured(&self) -> bool {
        self.ratings.average >= FEATURED_MIN_RATING
            || self.tags.iter().any(|t| FEATURED_TAGS.contains(&t.as_str()))
    }
}

/// Tags that put a product on the featured list regardless of rating
pub const FEATURED_TAGS: [&str; 3] = ["featured", "bestseller", "popular"];

pub const FEATURED_MIN_RATING: f64 = 4.0;

/// Ranges and values present across active products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterFacets {
    pub min_price: f64,
    pub max_price: f64,
    pub dosage_forms: Vec<DosageForm>,
    pub stock_statuses: Vec<StockStatus>,
}

impl Default for FilterFacets {
    fn default() -> Self {
        Self {
            min_price: 0.0,
            max_price: 10000.0,
            dosage_forms: Vec::new(),
            stock_statuses: Vec::new(),
        }
    }
}

/// Everything carried under one generic name
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaltInfo {
    pub name: String,
    pub brands: Vec<String>,
    pub manufacturers: Vec<String>,
    pub products: Vec<CatalogProduct>,
}

impl SaltInfo {
    /// Group products sharing a generic name. `None` when `products` is empty.
    pub fn from_products(products: Vec<CatalogProduct>) -> Option<Self> {
        let name = products.first()?.generic_name.clone();

        let mut brands: Vec<String> = Vec::new();
        let mut manufacturers: Vec<String> = Vec::new();
        for product in &products {
            let brand = product.display_brand();
            if !brands.iter().any(|b| b == brand) {
                brands.push(brand.to_string());
            }
            if !manufacturers.iter().any(|m| *m == product.manufacturer.name) {
                manufacturers.push(product.manufacturer.name.clone());
            }
        }

        Some(Self {
            name,
            brands,
            manufacturers,
            products,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ManufacturerInfo {
    pub manufacturer: Manufacturer,
    pub products: Vec<CatalogProduct>,
}

/// `GET /products` payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductListing {
    pub products: Vec<CatalogProduct>,
    pub pagination: PageInfo,
    pub filters: FilterFacets,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: CatalogProduct,
    pub related_products: Vec<CatalogProduct>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub products: Vec<CatalogProduct>,
    /// Distinct matches before truncation to `limit`
    pub total_results: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryListing {
    pub products: Vec<CatalogProduct>,
    pub category: Category,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ManufacturerListing {
    pub products: Vec<CatalogProduct>,
    pub manufacturer: Manufacturer,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductList {
    pub products: Vec<CatalogProduct>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ManufacturerDirectory {
    pub manufacturers: Vec<Manufacturer>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewOutcome {
    pub review: Review,
    pub ratings: Ratings,
}
