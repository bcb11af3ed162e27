//! Prometheus metrics for the relay.
//!
//! Recording goes through the `metrics` facade; the Prometheus recorder is
//! installed once per process and rendered by the `/metrics` handler.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder (first call only) and return its handle.
///
/// Safe to call repeatedly; tests build many routers in one process.
pub fn init() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("A global metrics recorder was already installed");
            }
            handle
        })
        .clone()
}

/// Count a finished request by route and response status
pub fn record_request(route: &'static str, status: u16) {
    counter!("relay_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
}

/// Record request latency for a route
pub fn record_duration(route: &'static str, start: Instant) {
    histogram!("relay_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Upstream could not be reached at all
pub fn record_upstream_error() {
    counter!("relay_upstream_errors_total").increment(1);
}

/// Count a playlist body rewritten into relay URLs
pub fn record_playlist_rewrite() {
    counter!("relay_playlists_rewritten_total").increment(1);
}
