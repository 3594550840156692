use crate::{config::Config, http_retry::RetryConfig, metrics};
use metrics_exporter_prometheus::PrometheusHandle;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Shared HTTP client for connection pooling
    pub http_client: Client,
    /// Retry policy for manifest fetches
    pub retry: RetryConfig,
    /// Prometheus exposition handle
    pub metrics: PrometheusHandle,
    pub started_at: Instant,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(config: Config) -> Self {
        let http_client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to create HTTP client");

        let retry = RetryConfig {
            max_attempts: config.fetch_max_attempts,
            timeout: Some(config.fetch_timeout()),
            ..RetryConfig::default()
        };

        Self {
            config: Arc::new(config),
            http_client,
            retry,
            metrics: metrics::init(),
            started_at: Instant::now(),
        }
    }
}
