//! Prometheus metrics recorder and `/metrics` endpoint handler.

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

// Metric name constants to avoid typos across modules.

/// API requests total (counter, labels: method).
pub const API_REQUESTS_TOTAL: &str = "api_requests_total";
/// API requests rejected by admission (counter).
pub const API_REQUESTS_REJECTED_TOTAL: &str = "api_requests_rejected_total";
/// API request duration seconds (histogram).
pub const API_REQUEST_DURATION_SECONDS: &str = "api_request_duration_seconds";
/// Live sessions (gauge).
pub const SESSIONS_ACTIVE: &str = "sessions_active";
/// Sessions created total (counter).
pub const SESSIONS_CREATED_TOTAL: &str = "sessions_created_total";
/// Sessions evicted by the sweep total (counter).
pub const SESSIONS_EVICTED_TOTAL: &str = "sessions_evicted_total";
