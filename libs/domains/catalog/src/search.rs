//! Search strategies.
//!
//! - Primary: ranked text search over the indexed product fields
//!   ([`CatalogRepository::text_search`]).
//! - Alternative: case-insensitive substring match over identifier fields
//!   ([`CatalogRepository::field_search`]). It catches hyphenated and compound
//!   drug names the text index tokenizes poorly.
//!
//! [`merged_search`] runs both and reconciles the results.

use std::fmt;

use crate::error::{CatalogError, CatalogResult};
use crate::models::CatalogProduct;
use crate::reconcile::{Reconciled, reconcile};
use crate::repository::CatalogRepository;

/// A trimmed, non-empty free-text query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// `None` for missing or blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Required form, used by the dedicated search endpoints.
    pub fn parse(raw: Option<&str>) -> CatalogResult<Self> {
        raw.and_then(Self::new)
            .ok_or(CatalogError::MissingSearchQuery)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased words of the query.
    pub fn tokens(&self) -> Vec<String> {
        words(&self.0).collect()
    }

    /// Escaped pattern matching the term anywhere in a value.
    pub fn contains_pattern(&self) -> String {
        regex::escape(&self.0)
    }

    /// Escaped pattern matching the whole value.
    pub fn exact_pattern(&self) -> String {
        format!("^{}$", regex::escape(&self.0))
    }

    /// Case-insensitive substring test.
    pub fn is_within(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0.to_lowercase())
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Identifier fields the alternative strategy can match on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Name,
    GenericName,
    BrandName,
    /// Resolved through the manufacturer record
    ManufacturerName,
    /// Resolved through the category record
    CategoryName,
}

impl MatchField {
    /// Document path for fields stored on the product itself.
    pub fn path(&self) -> Option<&'static str> {
        match self {
            MatchField::Name => Some("name"),
            MatchField::GenericName => Some("genericName"),
            MatchField::BrandName => Some("brandName"),
            MatchField::ManufacturerName | MatchField::CategoryName => None,
        }
    }

    pub fn value<'a>(&self, product: &'a CatalogProduct) -> Option<&'a str> {
        match self {
            MatchField::Name => Some(&product.name),
            MatchField::GenericName => Some(&product.generic_name),
            MatchField::BrandName => product.brand_name.as_deref(),
            MatchField::ManufacturerName => Some(&product.manufacturer.name),
            MatchField::CategoryName => Some(&product.category.name),
        }
    }
}

/// Fields the product search supplements the text index with
pub const PRODUCT_NAME_FIELDS: [MatchField; 3] =
    [MatchField::Name, MatchField::GenericName, MatchField::BrandName];

/// Fields the degraded-mode quick search matches on
pub const QUICK_SEARCH_FIELDS: [MatchField; 5] = [
    MatchField::Name,
    MatchField::BrandName,
    MatchField::GenericName,
    MatchField::ManufacturerName,
    MatchField::CategoryName,
];

/// Number of query words found in the text-indexed fields of `product`.
///
/// Zero means no match. The in-memory stand-in for a text score.
pub fn text_relevance(product: &CatalogProduct, term: &SearchTerm) -> usize {
    let tokens = term.tokens();
    let fields = [
        Some(product.name.as_str()),
        Some(product.generic_name.as_str()),
        product.brand_name.as_deref(),
        Some(product.description.as_str()),
        Some(product.composition.as_str()),
    ];

    fields
        .into_iter()
        .flatten()
        .map(|field| {
            let field_words: Vec<String> = words(field).collect();
            tokens.iter().filter(|t| field_words.contains(t)).count()
        })
        .sum()
}

/// Whether any of `fields` contains the term, ignoring case.
pub fn contains_match(product: &CatalogProduct, term: &SearchTerm, fields: &[MatchField]) -> bool {
    fields
        .iter()
        .filter_map(|field| field.value(product))
        .any(|value| term.is_within(value))
}

/// Primary strategy first, alternative second, reconciled to `limit`.
///
/// Both strategies are bounded by `limit`, so `total` is at most twice the
/// limit.
pub async fn merged_search(
    repository: &dyn CatalogRepository,
    term: &SearchTerm,
    limit: usize,
) -> CatalogResult<Reconciled<CatalogProduct>> {
    let primary = repository.text_search(term, limit).await?;
    let alternative = repository
        .field_search(term, &PRODUCT_NAME_FIELDS, Some(limit))
        .await?;

    tracing::debug!(
        term = %term,
        primary = primary.len(),
        alternative = alternative.len(),
        "Merging search strategies"
    );

    Ok(reconcile([primary, alternative], limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::InMemoryCatalogRepository;
    use crate::repository::MockCatalogRepository;

    fn term(raw: &str) -> SearchTerm {
        SearchTerm::new(raw).unwrap()
    }

    async fn fallback_product(name: &str) -> CatalogProduct {
        let repo = InMemoryCatalogRepository::with_fallback_dataset();
        repo.field_search(&term(name), &[MatchField::Name], Some(1))
            .await
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_blank_query_is_rejected() {
        assert!(matches!(
            SearchTerm::parse(Some("   ")),
            Err(CatalogError::MissingSearchQuery)
        ));
        assert!(matches!(
            SearchTerm::parse(None),
            Err(CatalogError::MissingSearchQuery)
        ));
        assert_eq!(SearchTerm::parse(Some(" crocin ")).unwrap().as_str(), "crocin");
    }

    #[test]
    fn test_patterns_escape_metacharacters() {
        let t = term("d-rise (1000 iu)");
        assert_eq!(t.contains_pattern(), r"d\-rise \(1000 iu\)");
        assert_eq!(t.exact_pattern(), r"^d\-rise \(1000 iu\)$");
        assert_eq!(t.tokens(), vec!["d", "rise", "1000", "iu"]);
    }

    #[tokio::test]
    async fn test_text_relevance_counts_word_hits() {
        let product = fallback_product("Paracetamol 500mg Tablets").await;

        assert!(text_relevance(&product, &term("paracetamol")) >= 2);
        assert_eq!(text_relevance(&product, &term("amoxicillin")), 0);
        // whole words only
        assert_eq!(text_relevance(&product, &term("parace")), 0);
    }

    #[tokio::test]
    async fn test_contains_match_on_partial_brand() {
        let product = fallback_product("Vitamin D3 Tablets").await;

        assert!(contains_match(&product, &term("d-ri"), &[MatchField::BrandName]));
        assert!(!contains_match(&product, &term("d-ri"), &[MatchField::Name]));
        assert!(contains_match(
            &product,
            &term("reddy"),
            &[MatchField::ManufacturerName]
        ));
    }

    #[tokio::test]
    async fn test_merged_search_prefers_primary_order() {
        let dataset = InMemoryCatalogRepository::with_fallback_dataset();
        let crocin = dataset
            .field_search(&term("crocin"), &[MatchField::BrandName], None)
            .await
            .unwrap();
        let calpol = dataset
            .field_search(&term("calpol"), &[MatchField::BrandName], None)
            .await
            .unwrap();

        let mut repo = MockCatalogRepository::new();
        let primary = calpol.clone();
        repo.expect_text_search()
            .withf(|t, limit| t.as_str() == "paracetamol" && *limit == 5)
            .return_once(move |_, _| Ok(primary));
        let mut alternative = crocin.clone();
        alternative.extend(calpol.clone());
        repo.expect_field_search()
            .withf(|t, fields, limit| {
                t.as_str() == "paracetamol" && fields[..] == PRODUCT_NAME_FIELDS[..] && *limit == Some(5)
            })
            .return_once(move |_, _, _| Ok(alternative));

        let merged = merged_search(&repo, &term("paracetamol"), 5).await.unwrap();

        assert_eq!(merged.total, 2);
        assert_eq!(merged.items[0].id, calpol[0].id);
        assert_eq!(merged.items[1].id, crocin[0].id);
    }

    #[tokio::test]
    async fn test_merged_search_bounds_alternative_strategy() {
        let dataset = InMemoryCatalogRepository::with_fallback_dataset();
        let everything = dataset
            .field_search(&term("tablets"), &PRODUCT_NAME_FIELDS, None)
            .await
            .unwrap();
        assert!(everything.len() > 4);

        let merged = merged_search(&dataset, &term("tablets"), 2).await.unwrap();

        assert_eq!(merged.items.len(), 2);
        assert!(merged.total <= 4);
    }

    #[tokio::test]
    async fn test_merged_search_propagates_store_errors() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_text_search()
            .returning(|_, _| Err(CatalogError::Database("socket closed".into())));

        let err = merged_search(&repo, &term("x"), 5).await.unwrap_err();
        assert!(err.is_store_failure());
    }
}
