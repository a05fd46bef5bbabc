//! Prometheus metrics recorder and `/metrics` endpoint handler.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Must be called once at server startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric name constants to avoid typos across crates.

/// HTTP requests total (counter, labels: method, path).
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
/// HTTP error responses total (counter, labels: status).
pub const HTTP_ERRORS_TOTAL: &str = "http_errors_total";
/// Events created total (counter).
pub const EVENTS_CREATED_TOTAL: &str = "events_created_total";
/// Events deleted total (counter).
pub const EVENTS_DELETED_TOTAL: &str = "events_deleted_total";
/// Tickets issued total (counter).
pub const TICKETS_ISSUED_TOTAL: &str = "tickets_issued_total";
/// Tickets cancelled total (counter).
pub const TICKETS_CANCELLED_TOTAL: &str = "tickets_cancelled_total";
/// Sold-out rejections total (counter).
pub const TICKETS_SOLD_OUT_TOTAL: &str = "tickets_sold_out_total";
/// Messages sent total (counter).
pub const MESSAGES_SENT_TOTAL: &str = "messages_sent_total";

/// Count one HTTP request. `path` is the route template (e.g.
/// `/events/{id}`), not the raw URI, to keep label cardinality bounded.
pub fn record_request(method: &str, path: &str) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .increment(1);
}

/// Count one HTTP error response (4xx or 5xx).
pub fn record_error(status: u16) {
    counter!(HTTP_ERRORS_TOTAL, "status" => status.to_string()).increment(1);
}
