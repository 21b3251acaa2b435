//! Source Selector: runs each catalogue read against the live store when it
//! is reachable and falls through to the bundled dataset when it is not.

use futures::future::BoxFuture;
use observability::CatalogMetrics;
use serde::Serialize;
use std::sync::Arc;
use strum::{Display, IntoStaticStr};
use utoipa::ToSchema;

use crate::error::{CatalogError, CatalogResult};
use crate::fallback::InMemoryCatalogRepository;
use crate::models::CatalogProduct;
use crate::reconcile::Reconciled;
use crate::repository::{CatalogRepository, Page};

/// Which backend served a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataSource {
    Database,
    Mock,
}

/// When a successful store read still falls through to the fallback dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Only on store failure or unavailability
    OnFailure,
    /// Also when the store answered with nothing
    OnFailureOrEmpty,
}

/// A value tagged with its origin and the store's liveness at answer time
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: DataSource,
    pub database_connected: bool,
}

impl<T> Sourced<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            value: f(self.value),
            source: self.source,
            database_connected: self.database_connected,
        }
    }
}

impl<T> Sourced<Option<T>> {
    /// Unwrap a found record, or fail with `err`.
    pub fn ok_or(self, err: CatalogError) -> CatalogResult<Sourced<T>> {
        let Sourced {
            value,
            source,
            database_connected,
        } = self;
        value.map(|value| Sourced {
            value,
            source,
            database_connected,
        })
        .ok_or(err)
    }
}

/// Number of records in a read result; zero counts as empty.
pub trait ResultCount {
    fn result_count(&self) -> usize;

    fn is_empty_result(&self) -> bool {
        self.result_count() == 0
    }
}

impl<T> ResultCount for Vec<T> {
    fn result_count(&self) -> usize {
        self.len()
    }
}

impl<T> ResultCount for Option<T> {
    fn result_count(&self) -> usize {
        usize::from(self.is_some())
    }
}

impl<T> ResultCount for Page<T> {
    fn result_count(&self) -> usize {
        self.items.len()
    }
}

impl<T> ResultCount for Reconciled<T> {
    fn result_count(&self) -> usize {
        self.items.len()
    }
}

impl<A: ResultCount, B> ResultCount for (A, B) {
    fn result_count(&self) -> usize {
        self.0.result_count()
    }
}

impl ResultCount for CatalogProduct {
    fn result_count(&self) -> usize {
        1
    }
}

/// One read, runnable against either backend
pub type SourceOp<'a, T> = BoxFuture<'a, CatalogResult<T>>;

/// Chooses the backend per request.
///
/// Liveness comes from [`CatalogRepository::is_available`]; nothing here
/// probes the store or retries a failed query.
pub struct SourceSelector<R: CatalogRepository> {
    store: Arc<R>,
    fallback: Arc<InMemoryCatalogRepository>,
}

impl<R: CatalogRepository> Clone for SourceSelector<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            fallback: Arc::clone(&self.fallback),
        }
    }
}

impl<R: CatalogRepository> SourceSelector<R> {
    pub fn new(store: Arc<R>, fallback: Arc<InMemoryCatalogRepository>) -> Self {
        Self { store, fallback }
    }

    /// The live store, for writes that never fall back.
    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn database_connected(&self) -> bool {
        self.store.is_available()
    }

    /// Run `op` against the store, then against the fallback dataset when
    /// `policy` says the store's answer is not good enough.
    ///
    /// Errors that are not store failures (not found, bad input) come back
    /// from the store attempt unchanged.
    pub async fn select<'a, T, F>(
        &'a self,
        operation: &'static str,
        policy: FallbackPolicy,
        op: F,
    ) -> CatalogResult<Sourced<T>>
    where
        T: ResultCount,
        F: Fn(&'a dyn CatalogRepository) -> SourceOp<'a, T>,
    {
        if self.store.is_available() {
            match op(self.store.as_ref()).await {
                Ok(value)
                    if policy == FallbackPolicy::OnFailureOrEmpty && value.is_empty_result() =>
                {
                    tracing::debug!(operation, "Store returned no results, trying fallback dataset");
                    CatalogMetrics::record_fallback(operation, "empty");
                }
                Ok(value) => return Ok(self.tag(operation, value, DataSource::Database)),
                Err(err) if err.is_store_failure() => {
                    tracing::warn!(operation, error = %err, "Store query failed, serving fallback dataset");
                    CatalogMetrics::record_fallback(operation, "error");
                }
                Err(err) => return Err(err),
            }
        } else {
            tracing::debug!(operation, "Store unavailable, serving fallback dataset");
            CatalogMetrics::record_fallback(operation, "unavailable");
        }

        let value = op(self.fallback.as_ref()).await?;
        Ok(self.tag(operation, value, DataSource::Mock))
    }

    fn tag<T: ResultCount>(
        &self,
        operation: &'static str,
        value: T,
        source: DataSource,
    ) -> Sourced<T> {
        CatalogMetrics::record_query(operation, source.into(), value.result_count());

        Sourced {
            value,
            source,
            database_connected: self.store.is_available(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCatalogRepository;
    use crate::search::{MatchField, SearchTerm};
    use database::ConnectionStatus;

    fn term(raw: &str) -> SearchTerm {
        SearchTerm::new(raw).unwrap()
    }

    fn selector<R: CatalogRepository>(store: R) -> SourceSelector<R> {
        SourceSelector::new(
            Arc::new(store),
            Arc::new(InMemoryCatalogRepository::with_fallback_dataset()),
        )
    }

    async fn search_brand<R: CatalogRepository>(
        selector: &SourceSelector<R>,
        policy: FallbackPolicy,
        raw: &str,
    ) -> CatalogResult<Sourced<Vec<CatalogProduct>>> {
        let term = term(raw);
        let term = &term;
        selector
            .select("test", policy, move |repo| {
                repo.field_search(term, &[MatchField::BrandName], None)
            })
            .await
    }

    #[tokio::test]
    async fn test_available_store_serves_result() {
        let mut store = MockCatalogRepository::new();
        store.expect_is_available().return_const(true);
        store
            .expect_field_search()
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));

        let result = search_brand(&selector(store), FallbackPolicy::OnFailure, "crocin")
            .await
            .unwrap();

        assert_eq!(result.source, DataSource::Database);
        assert!(result.database_connected);
        assert!(result.value.is_empty());
    }

    #[tokio::test]
    async fn test_empty_store_result_falls_through_when_policy_says_so() {
        let mut store = MockCatalogRepository::new();
        store.expect_is_available().return_const(true);
        store
            .expect_field_search()
            .returning(|_, _, _| Ok(Vec::new()));

        let result = search_brand(&selector(store), FallbackPolicy::OnFailureOrEmpty, "crocin")
            .await
            .unwrap();

        assert_eq!(result.source, DataSource::Mock);
        assert!(result.database_connected);
        assert_eq!(result.value.len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_falls_through() {
        let mut store = MockCatalogRepository::new();
        store.expect_is_available().return_const(true);
        store
            .expect_field_search()
            .returning(|_, _, _| Err(CatalogError::Database("connection reset".into())));

        let result = search_brand(&selector(store), FallbackPolicy::OnFailure, "calpol")
            .await
            .unwrap();

        assert_eq!(result.source, DataSource::Mock);
        assert_eq!(result.value[0].brand_name.as_deref(), Some("Calpol"));
    }

    #[tokio::test]
    async fn test_unavailable_store_is_never_queried() {
        let mut store = MockCatalogRepository::new();
        store.expect_is_available().return_const(false);
        store.expect_field_search().never();

        let result = search_brand(&selector(store), FallbackPolicy::OnFailure, "crocin")
            .await
            .unwrap();

        assert_eq!(result.source, DataSource::Mock);
        assert!(!result.database_connected);
    }

    #[tokio::test]
    async fn test_domain_errors_are_not_masked() {
        let mut store = MockCatalogRepository::new();
        store.expect_is_available().return_const(true);
        store
            .expect_field_search()
            .returning(|_, _, _| Err(CatalogError::ProductNotFound));

        let err = search_brand(&selector(store), FallbackPolicy::OnFailureOrEmpty, "crocin")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::ProductNotFound));
    }

    #[tokio::test]
    async fn test_no_match_anywhere_is_empty_not_error() {
        let store = InMemoryCatalogRepository::new().with_status(ConnectionStatus::disconnected());

        let result = search_brand(&selector(store), FallbackPolicy::OnFailureOrEmpty, "zzzz")
            .await
            .unwrap();

        assert_eq!(result.source, DataSource::Mock);
        assert!(result.value.is_empty());
    }

    #[test]
    fn test_data_source_wire_values() {
        assert_eq!(
            serde_json::to_value(DataSource::Mock).unwrap(),
            serde_json::json!("mock")
        );
        let label: &'static str = DataSource::Database.into();
        assert_eq!(label, "database");
    }
}
