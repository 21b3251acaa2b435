//! Prometheus metrics for the API services.
//!
//! - recorder installation and the `/metrics` handler
//! - HTTP request metrics middleware
//! - catalog query and degraded-mode counters
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{CatalogMetrics, init_metrics, metrics_handler};
//!
//! init_metrics()?;
//!
//! CatalogMetrics::record_query("search", "database", 7);
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod catalog;
pub mod middleware;

pub use catalog::CatalogMetrics;
pub use middleware::metrics_middleware;

pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Later calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for `GET /metrics`
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    describe_counter!(
        "catalog_queries_total",
        "Catalog reads by operation and serving source"
    );
    describe_histogram!(
        "catalog_query_results",
        "Number of records returned per catalog read"
    );
    describe_counter!(
        "catalog_fallbacks_total",
        "Catalog reads answered from the fallback dataset, by reason"
    );
    describe_gauge!(
        "database_connected",
        "1 while the document store answers liveness probes"
    );
}
