//! Prometheus metrics.
//!
//! The recorder is installed once per process; repeated router builds (tests)
//! share the same handle.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::warn;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder (idempotent) and return its handle.
pub fn init() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if let Err(e) = ::metrics::set_global_recorder(recorder) {
                warn!("Metrics recorder already installed: {}", e);
            }
            handle
        })
        .clone()
}

/// Count a served request by endpoint and status code.
pub fn record_request(endpoint: &'static str, status: u16) {
    ::metrics::counter!(
        "medialens_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record request latency since `start`.
pub fn record_duration(endpoint: &'static str, start: Instant) {
    ::metrics::histogram!("medialens_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Count a failed manifest fetch against a remote origin.
pub fn record_origin_error() {
    ::metrics::counter!("medialens_origin_errors_total").increment(1);
}

/// Count a completed manifest analysis.
pub fn record_analysis() {
    ::metrics::counter!("medialens_analyses_total").increment(1);
}
