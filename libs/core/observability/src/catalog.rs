//! Catalog read metrics.

use metrics::{counter, gauge, histogram};

/// Catalog metrics recorder
pub struct CatalogMetrics;

impl CatalogMetrics {
    /// Record a served catalog read. `source` is `database` or `mock`.
    pub fn record_query(operation: &'static str, source: &'static str, results: usize) {
        counter!("catalog_queries_total", "operation" => operation, "source" => source)
            .increment(1);
        histogram!("catalog_query_results", "operation" => operation).record(results as f64);

        tracing::debug!(operation, source, results, "Catalog query served");
    }

    /// Record a read that fell through to the fallback dataset.
    ///
    /// `reason` is one of `unavailable`, `error`, `empty`.
    pub fn record_fallback(operation: &'static str, reason: &'static str) {
        counter!("catalog_fallbacks_total", "operation" => operation, "reason" => reason)
            .increment(1);
    }

    pub fn set_database_connected(connected: bool) {
        gauge!("database_connected").set(if connected { 1.0 } else { 0.0 });
    }
}
