//! In-memory catalogue.
//!
//! Serves as the bundled fallback dataset when the store is unreachable, and
//! as a lightweight repository for tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use database::ConnectionStatus;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::filter::{Pagination, ProductFilter, SortOrder};
use crate::models::{
    CatalogProduct, Category, CategorySummary, DosageForm, FilterFacets, Manufacturer,
    ManufacturerSummary, Pricing, Product, Ratings, Review, StockStatus,
};
use crate::repository::{CatalogRepository, Page};
use crate::search::{MatchField, SearchTerm, contains_match, text_relevance};

#[derive(Debug, Default)]
struct CatalogData {
    categories: Vec<Category>,
    manufacturers: Vec<Manufacturer>,
    products: Vec<Product>,
}

impl CatalogData {
    fn resolve(&self, product: &Product) -> CatalogProduct {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == product.category)
            .map(CategorySummary::from)
            .unwrap_or_else(|| CategorySummary::unknown(product.category));
        let manufacturer = self
            .manufacturers
            .iter()
            .find(|m| m.id == product.manufacturer)
            .map(ManufacturerSummary::from)
            .unwrap_or_else(|| ManufacturerSummary::unknown(product.manufacturer));

        CatalogProduct::from_product(product.clone(), category, manufacturer)
    }

    /// Active products, resolved, in insertion order
    fn active(&self) -> impl Iterator<Item = CatalogProduct> + '_ {
        self.products
            .iter()
            .filter(|p| p.is_active)
            .map(|p| self.resolve(p))
    }
}

fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Page<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(pagination.skip() as usize)
        .take(pagination.limit as usize)
        .collect();
    Page { items, total }
}

/// In-memory implementation of [`CatalogRepository`]
#[derive(Debug, Clone)]
pub struct InMemoryCatalogRepository {
    data: Arc<RwLock<CatalogData>>,
    status: ConnectionStatus,
}

impl Default for InMemoryCatalogRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalogRepository {
    /// An empty catalogue that reports itself available.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(CatalogData::default())),
            status: ConnectionStatus::connected(),
        }
    }

    /// The bundled sample catalogue.
    pub fn with_fallback_dataset() -> Self {
        let data = CatalogData {
            categories: dataset::categories(),
            manufacturers: dataset::manufacturers(),
            products: dataset::products(),
        };
        Self {
            data: Arc::new(RwLock::new(data)),
            status: ConnectionStatus::connected(),
        }
    }

    /// Report availability from `status` instead of always-on.
    pub fn with_status(mut self, status: ConnectionStatus) -> Self {
        self.status = status;
        self
    }

    pub async fn insert_category(&self, category: Category) {
        self.data.write().await.categories.push(category);
    }

    pub async fn insert_manufacturer(&self, manufacturer: Manufacturer) {
        self.data.write().await.manufacturers.push(manufacturer);
    }

    pub async fn insert_product(&self, product: Product) {
        self.data.write().await.products.push(product);
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    fn is_available(&self) -> bool {
        self.status.is_connected()
    }

    async fn find_products(
        &self,
        filter: &ProductFilter,
        sort: SortOrder,
        pagination: Pagination,
    ) -> CatalogResult<Page<CatalogProduct>> {
        let data = self.data.read().await;

        let mut products: Vec<CatalogProduct> = data
            .products
            .iter()
            .map(|p| data.resolve(p))
            .filter(|p| filter.matches(p))
            .collect();
        products.sort_by(|a, b| sort.compare(a, b));

        Ok(paginate(products, pagination))
    }

    async fn facets(&self) -> CatalogResult<FilterFacets> {
        let data = self.data.read().await;
        let active: Vec<&Product> = data.products.iter().filter(|p| p.is_active).collect();

        if active.is_empty() {
            return Ok(FilterFacets::default());
        }

        let prices = active.iter().map(|p| p.price.distributor_price);
        let dosage_forms: BTreeSet<DosageForm> = active.iter().map(|p| p.dosage_form).collect();
        let stock_statuses: BTreeSet<StockStatus> =
            active.iter().map(|p| p.stock_status).collect();

        Ok(FilterFacets {
            min_price: prices.clone().fold(f64::INFINITY, f64::min),
            max_price: prices.fold(f64::NEG_INFINITY, f64::max),
            dosage_forms: dosage_forms.into_iter().collect(),
            stock_statuses: stock_statuses.into_iter().collect(),
        })
    }

    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<CatalogProduct>> {
        let data = self.data.read().await;
        Ok(data.products.iter().find(|p| p.id == id).map(|p| data.resolve(p)))
    }

    async fn related_products(
        &self,
        product: &CatalogProduct,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogProduct>> {
        let data = self.data.read().await;
        Ok(data
            .active()
            .filter(|p| p.category.id == product.category.id && p.id != product.id)
            .take(limit)
            .collect())
    }

    async fn text_search(
        &self,
        term: &SearchTerm,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogProduct>> {
        let data = self.data.read().await;

        let mut scored: Vec<(usize, CatalogProduct)> = data
            .active()
            .map(|p| (text_relevance(&p, term), p))
            .filter(|(score, _)| *score > 0)
            .collect();
        // stable: equal scores keep dataset order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored.into_iter().take(limit).map(|(_, p)| p).collect())
    }

    async fn field_search(
        &self,
        term: &SearchTerm,
        fields: &[MatchField],
        limit: Option<usize>,
    ) -> CatalogResult<Vec<CatalogProduct>> {
        let data = self.data.read().await;
        Ok(data
            .active()
            .filter(|p| contains_match(p, term, fields))
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn find_by_generic_name(&self, name: &str) -> CatalogResult<Vec<CatalogProduct>> {
        let wanted = name.trim().to_lowercase();
        let data = self.data.read().await;
        Ok(data
            .active()
            .filter(|p| p.generic_name.to_lowercase() == wanted)
            .collect())
    }

    async fn featured_products(&self, limit: usize) -> CatalogResult<Vec<CatalogProduct>> {
        let data = self.data.read().await;

        let mut featured: Vec<CatalogProduct> = data.active().filter(|p| p.is_featured()).collect();
        featured.sort_by(|a, b| {
            b.ratings
                .average
                .total_cmp(&a.ratings.average)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        featured.truncate(limit);

        Ok(featured)
    }

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        let data = self.data.read().await;
        Ok(data.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let data = self.data.read().await;
        let mut categories: Vec<Category> = data
            .categories
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        categories.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(categories)
    }

    async fn get_manufacturer(&self, id: Uuid) -> CatalogResult<Option<Manufacturer>> {
        let data = self.data.read().await;
        Ok(data.manufacturers.iter().find(|m| m.id == id).cloned())
    }

    async fn find_manufacturer_by_name(&self, name: &str) -> CatalogResult<Option<Manufacturer>> {
        let name = name.trim();
        let data = self.data.read().await;
        Ok(data
            .manufacturers
            .iter()
            .find(|m| m.is_active && m.is_named(name))
            .cloned())
    }

    async fn list_manufacturers(
        &self,
        search: Option<SearchTerm>,
        pagination: Pagination,
    ) -> CatalogResult<Page<Manufacturer>> {
        let data = self.data.read().await;
        let tokens = search.as_ref().map(SearchTerm::tokens);

        let mut manufacturers: Vec<Manufacturer> = data
            .manufacturers
            .iter()
            .filter(|m| m.is_active)
            .filter(|m| match &tokens {
                None => true,
                Some(tokens) => {
                    let haystack = [
                        Some(m.name.as_str()),
                        m.company_name.as_deref(),
                        m.description.as_deref(),
                    ]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase();
                    tokens.iter().any(|t| haystack.contains(t.as_str()))
                }
            })
            .cloned()
            .collect();
        manufacturers.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(paginate(manufacturers, pagination))
    }

    async fn append_review(
        &self,
        product_id: Uuid,
        review: &Review,
        ratings: &Ratings,
        expected_count: u32,
    ) -> CatalogResult<bool> {
        let mut data = self.data.write().await;

        let Some(product) = data.products.iter_mut().find(|p| p.id == product_id) else {
            return Ok(false);
        };
        if product.reviews.len() as u32 != expected_count
            || product.reviews.iter().any(|r| r.user == review.user)
        {
            return Ok(false);
        }

        product.reviews.push(review.clone());
        product.ratings = *ratings;
        product.updated_at = Utc::now();

        tracing::info!(product_id = %product_id, "Review appended");
        Ok(true)
    }
}

/// Id of the one withdrawn product in the bundled dataset
#[cfg(test)]
pub(crate) fn inactive_product_id() -> Uuid {
    dataset::product_id(13)
}

/// The bundled sample catalogue. Ids are fixed so links survive restarts.
mod dataset {
    use super::*;

    const fn category_id(n: u128) -> Uuid {
        Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_1000 + n)
    }

    const fn manufacturer_id(n: u128) -> Uuid {
        Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_2000 + n)
    }

    pub(super) const fn product_id(n: u128) -> Uuid {
        Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_3000 + n)
    }

    /// Midnight UTC, `days` after 2024-01-01
    fn day(days: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(19_723 + days)
    }

    const PAIN_RELIEF: u128 = 1;
    const ANTIBIOTICS: u128 = 2;
    const DIABETES: u128 = 3;
    const CARDIOVASCULAR: u128 = 4;
    const GASTROENTEROLOGY: u128 = 5;
    const RESPIRATORY: u128 = 6;
    const SUPPLEMENTS: u128 = 7;

    const SUN_PHARMA: u128 = 1;
    const CIPLA: u128 = 2;
    const DR_REDDYS: u128 = 3;
    const GSK: u128 = 4;
    const ABBOTT: u128 = 5;
    const PFIZER: u128 = 6;

    pub(super) fn categories() -> Vec<Category> {
        [
            (PAIN_RELIEF, "Pain Relief", "Analgesics and anti-inflammatory medications"),
            (ANTIBIOTICS, "Antibiotics", "Bacterial infection treatments"),
            (DIABETES, "Diabetes", "Blood sugar management medications"),
            (CARDIOVASCULAR, "Cardiovascular", "Heart and blood pressure medications"),
            (GASTROENTEROLOGY, "Gastroenterology", "Digestive system medications"),
            (RESPIRATORY, "Respiratory", "Breathing and lung medications"),
            (SUPPLEMENTS, "Supplements", "Vitamins and nutritional supplements"),
        ]
        .into_iter()
        .map(|(n, name, description)| Category {
            id: category_id(n),
            name: name.to_string(),
            description: Some(description.to_string()),
            icon: None,
            is_active: true,
            sort_order: n as i32,
        })
        .collect()
    }

    pub(super) fn manufacturers() -> Vec<Manufacturer> {
        [
            (SUN_PHARMA, "Sun Pharma", "Sun Pharmaceutical Industries Ltd.", "India", "https://www.sunpharma.com", "Leading pharmaceutical company in India"),
            (CIPLA, "Cipla", "Cipla Limited", "India", "https://www.cipla.com", "Global pharmaceutical company with focus on respiratory care"),
            (DR_REDDYS, "Dr. Reddy's", "Dr. Reddy's Laboratories Ltd.", "India", "https://www.drreddys.com", "Leading generic pharmaceutical company"),
            (GSK, "GSK", "GlaxoSmithKline plc", "UK", "https://www.gsk.com", "Global healthcare company"),
            (ABBOTT, "Abbott", "Abbott Laboratories", "USA", "https://www.abbott.com", "Healthcare technology company"),
            (PFIZER, "Pfizer", "Pfizer Inc.", "USA", "https://www.pfizer.com", "Leading biopharmaceutical company"),
        ]
        .into_iter()
        .map(|(n, name, company, country, website, description)| Manufacturer {
            id: manufacturer_id(n),
            name: name.to_string(),
            company_name: Some(company.to_string()),
            description: Some(description.to_string()),
            logo: None,
            country: Some(country.to_string()),
            website: Some(website.to_string()),
            is_active: true,
        })
        .collect()
    }

    struct Seed {
        n: u128,
        name: &'static str,
        generic: &'static str,
        brand: &'static str,
        description: &'static str,
        composition: &'static str,
        strength: &'static str,
        pack: &'static str,
        form: DosageForm,
        category: u128,
        manufacturer: u128,
        /// mrp, distributor, retailer
        price: (f64, f64, f64),
        rx: bool,
        stock: StockStatus,
        tags: &'static [&'static str],
        /// average, count
        rating: (f64, u32),
        active: bool,
    }

    const SEEDS: &[Seed] = &[
        Seed {
            n: 1,
            name: "Paracetamol 500mg Tablets",
            generic: "Paracetamol",
            brand: "Crocin",
            description: "Effective pain reliever and fever reducer for adults and children",
            composition: "Paracetamol 500mg",
            strength: "500mg",
            pack: "10 tablets",
            form: DosageForm::Tablet,
            category: PAIN_RELIEF,
            manufacturer: SUN_PHARMA,
            price: (25.0, 20.0, 22.0),
            rx: false,
            stock: StockStatus::InStock,
            tags: &["pain-relief", "fever", "paracetamol", "bestseller"],
            rating: (4.5, 128),
            active: true,
        },
        Seed {
            n: 2,
            name: "Paracetamol 120mg Oral Suspension",
            generic: "Paracetamol",
            brand: "Calpol",
            description: "Paediatric fever and pain relief suspension",
            composition: "Paracetamol 120mg per 5ml",
            strength: "120mg/5ml",
            pack: "60ml bottle",
            form: DosageForm::Syrup,
            category: PAIN_RELIEF,
            manufacturer: GSK,
            price: (45.0, 36.0, 40.0),
            rx: false,
            stock: StockStatus::InStock,
            tags: &["pain-relief", "fever", "paediatric"],
            rating: (4.3, 64),
            active: true,
        },
        Seed {
            n: 3,
            name: "Amoxicillin 250mg Capsules",
            generic: "Amoxicillin",
            brand: "Amoxil",
            description: "Broad-spectrum antibiotic for bacterial infections",
            composition: "Amoxicillin Trihydrate 250mg",
            strength: "250mg",
            pack: "10 capsules",
            form: DosageForm::Capsule,
            category: ANTIBIOTICS,
            manufacturer: CIPLA,
            price: (80.0, 65.0, 72.0),
            rx: true,
            stock: StockStatus::InStock,
            tags: &["antibiotic", "bacterial-infection", "amoxicillin"],
            rating: (4.1, 37),
            active: true,
        },
        Seed {
            n: 4,
            name: "Azithromycin 500mg Tablets",
            generic: "Azithromycin",
            brand: "Azee",
            description: "Macrolide antibiotic for respiratory and skin infections",
            composition: "Azithromycin Dihydrate 500mg",
            strength: "500mg",
            pack: "3 tablets",
            form: DosageForm::Tablet,
            category: ANTIBIOTICS,
            manufacturer: CIPLA,
            price: (120.0, 98.0, 108.0),
            rx: true,
            stock: StockStatus::LimitedStock,
            tags: &["antibiotic", "azithromycin"],
            rating: (3.9, 21),
            active: true,
        },
        Seed {
            n: 5,
            name: "Vitamin D3 Tablets",
            generic: "Cholecalciferol",
            brand: "D-Rise",
            description: "Essential vitamin D3 supplement for bone health",
            composition: "Cholecalciferol 1000 IU",
            strength: "1000 IU",
            pack: "30 tablets",
            form: DosageForm::Tablet,
            category: SUPPLEMENTS,
            manufacturer: DR_REDDYS,
            price: (150.0, 120.0, 135.0),
            rx: false,
            stock: StockStatus::InStock,
            tags: &["vitamin-d", "bone-health", "supplement", "popular"],
            rating: (4.6, 88),
            active: true,
        },
        Seed {
            n: 6,
            name: "Metformin 500mg Tablets",
            generic: "Metformin Hydrochloride",
            brand: "Glycomet",
            description: "First-line oral medication for type 2 diabetes",
            composition: "Metformin Hydrochloride 500mg",
            strength: "500mg",
            pack: "20 tablets",
            form: DosageForm::Tablet,
            category: DIABETES,
            manufacturer: SUN_PHARMA,
            price: (40.0, 31.0, 35.0),
            rx: true,
            stock: StockStatus::InStock,
            tags: &["diabetes", "metformin"],
            rating: (4.2, 54),
            active: true,
        },
        Seed {
            n: 7,
            name: "Atorvastatin 10mg Tablets",
            generic: "Atorvastatin",
            brand: "Lipitor",
            description: "Statin for lowering LDL cholesterol",
            composition: "Atorvastatin Calcium 10mg",
            strength: "10mg",
            pack: "15 tablets",
            form: DosageForm::Tablet,
            category: CARDIOVASCULAR,
            manufacturer: PFIZER,
            price: (180.0, 150.0, 165.0),
            rx: true,
            stock: StockStatus::InStock,
            tags: &["cholesterol", "statin"],
            rating: (3.8, 19),
            active: true,
        },
        Seed {
            n: 8,
            name: "Amlodipine 5mg Tablets",
            generic: "Amlodipine",
            brand: "Norvasc",
            description: "Calcium channel blocker for hypertension and angina",
            composition: "Amlodipine Besylate 5mg",
            strength: "5mg",
            pack: "30 tablets",
            form: DosageForm::Tablet,
            category: CARDIOVASCULAR,
            manufacturer: PFIZER,
            price: (95.0, 78.0, 86.0),
            rx: true,
            stock: StockStatus::LimitedStock,
            tags: &["hypertension", "blood-pressure"],
            rating: (4.0, 26),
            active: true,
        },
        Seed {
            n: 9,
            name: "Omeprazole 20mg Capsules",
            generic: "Omeprazole",
            brand: "Omez",
            description: "Proton pump inhibitor for acidity and ulcers",
            composition: "Omeprazole 20mg",
            strength: "20mg",
            pack: "15 capsules",
            form: DosageForm::Capsule,
            category: GASTROENTEROLOGY,
            manufacturer: DR_REDDYS,
            price: (60.0, 48.0, 54.0),
            rx: false,
            stock: StockStatus::InStock,
            tags: &["acidity", "ulcer"],
            rating: (3.7, 12),
            active: true,
        },
        Seed {
            n: 10,
            name: "Salbutamol 100mcg Inhaler",
            generic: "Salbutamol",
            brand: "Asthalin",
            description: "Bronchodilator for relief of asthma symptoms",
            composition: "Salbutamol Sulphate 100mcg per dose",
            strength: "100mcg",
            pack: "200 doses",
            form: DosageForm::Inhaler,
            category: RESPIRATORY,
            manufacturer: CIPLA,
            price: (160.0, 130.0, 145.0),
            rx: true,
            stock: StockStatus::InStock,
            tags: &["asthma", "respiratory", "featured"],
            rating: (3.6, 15),
            active: true,
        },
        Seed {
            n: 11,
            name: "Ibuprofen 400mg Tablets",
            generic: "Ibuprofen",
            brand: "Brufen",
            description: "Anti-inflammatory pain reliever",
            composition: "Ibuprofen 400mg",
            strength: "400mg",
            pack: "15 tablets",
            form: DosageForm::Tablet,
            category: PAIN_RELIEF,
            manufacturer: ABBOTT,
            price: (35.0, 28.0, 31.0),
            rx: false,
            stock: StockStatus::InStock,
            tags: &["pain-relief", "anti-inflammatory"],
            rating: (3.5, 9),
            active: true,
        },
        Seed {
            n: 12,
            name: "Antacid Gel",
            generic: "Magaldrate and Simethicone",
            brand: "Digene",
            description: "Fast relief from acidity, heartburn and gas",
            composition: "Magaldrate 400mg and Simethicone 20mg per 5ml",
            strength: "400mg/20mg",
            pack: "200ml bottle",
            form: DosageForm::Gel,
            category: GASTROENTEROLOGY,
            manufacturer: ABBOTT,
            price: (110.0, 90.0, 100.0),
            rx: false,
            stock: StockStatus::OutOfStock,
            tags: &["acidity", "antacid"],
            rating: (0.0, 0),
            active: true,
        },
        Seed {
            n: 13,
            name: "Ranitidine 150mg Tablets",
            generic: "Ranitidine",
            brand: "Zinetac",
            description: "H2 blocker, withdrawn from sale",
            composition: "Ranitidine Hydrochloride 150mg",
            strength: "150mg",
            pack: "30 tablets",
            form: DosageForm::Tablet,
            category: GASTROENTEROLOGY,
            manufacturer: GSK,
            price: (30.0, 24.0, 27.0),
            rx: false,
            stock: StockStatus::Discontinued,
            tags: &["acidity"],
            rating: (0.0, 0),
            active: false,
        },
    ];

    pub(super) fn products() -> Vec<Product> {
        SEEDS
            .iter()
            .map(|seed| {
                let created = day(seed.n as i64);
                Product {
                    id: product_id(seed.n),
                    name: seed.name.to_string(),
                    generic_name: seed.generic.to_string(),
                    brand_name: Some(seed.brand.to_string()),
                    description: seed.description.to_string(),
                    composition: seed.composition.to_string(),
                    strength: Some(seed.strength.to_string()),
                    pack_size: Some(seed.pack.to_string()),
                    dosage_form: seed.form,
                    category: category_id(seed.category),
                    manufacturer: manufacturer_id(seed.manufacturer),
                    price: Pricing {
                        mrp: seed.price.0,
                        distributor_price: seed.price.1,
                        retailer_price: seed.price.2,
                    },
                    stock_status: seed.stock,
                    prescription_required: seed.rx,
                    is_active: seed.active,
                    tags: seed.tags.iter().map(|t| t.to_string()).collect(),
                    images: Vec::new(),
                    ratings: Ratings {
                        average: seed.rating.0,
                        count: seed.rating.1,
                    },
                    reviews: Vec::new(),
                    min_order_quantity: 1,
                    gst_rate: 12.0,
                    created_at: created,
                    updated_at: created,
                }
            })
            .collect()
    }
}
