use crate::{config::Config, upstream};
use metrics_exporter_prometheus::PrometheusHandle;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Shared HTTP client for upstream connection pooling
    pub http_client: Client,
    /// Renders the Prometheus exposition for `/metrics`
    pub metrics: PrometheusHandle,
    /// Process start, reported by `/health`
    pub started_at: Instant,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            config: Arc::new(config),
            http_client: upstream::build_client()?,
            metrics: crate::metrics::init(),
            started_at: Instant::now(),
        })
    }
}
