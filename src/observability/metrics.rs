use anyhow::{Context, Result};
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::helpers::time::now_i64;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // API metrics
    pub api_requests: IntCounterVec,
    pub api_request_duration: HistogramVec,
    pub rate_limit_waits: IntCounterVec,

    // Credential metrics
    pub token_acquisitions: IntCounterVec,

    // Export metrics
    pub users_listed: IntCounter,
    pub role_lookups: IntCounterVec,
    pub rows_exported: IntCounter,
    pub last_run_unix: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("roleexporter".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // API
            api_requests: IntCounterVec::new(Opts::new("api_requests_total", "Provider API requests by endpoint and HTTP status"),&["endpoint", "status"],).unwrap(),
            api_request_duration: HistogramVec::new(HistogramOpts::new("api_request_duration_seconds", "Provider API request duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["endpoint"],).unwrap(),
            rate_limit_waits: IntCounterVec::new(Opts::new("rate_limit_waits_total", "Waits caused by HTTP 429"),&["endpoint"],).unwrap(),

            // Credentials
            token_acquisitions: IntCounterVec::new(Opts::new("token_acquisitions_total", "Bearer token requests by outcome"),&["outcome"],).unwrap(),

            // Export
            users_listed: IntCounter::new("users_listed_total", "User records returned by the list endpoint").unwrap(),
            role_lookups: IntCounterVec::new(Opts::new("role_lookups_total", "Role lookups by outcome"),&["outcome"],).unwrap(),
            rows_exported: IntCounter::new("rows_exported_total", "Rows written to the CSV file").unwrap(),
            last_run_unix: IntGauge::new("last_run_timestamp_seconds", "Unix time the last export finished").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.api_requests.clone())).unwrap();
        reg.register(Box::new(metrics.api_request_duration.clone())).unwrap();
        reg.register(Box::new(metrics.rate_limit_waits.clone())).unwrap();
        reg.register(Box::new(metrics.token_acquisitions.clone())).unwrap();
        reg.register(Box::new(metrics.users_listed.clone())).unwrap();
        reg.register(Box::new(metrics.role_lookups.clone())).unwrap();
        reg.register(Box::new(metrics.rows_exported.clone())).unwrap();
        reg.register(Box::new(metrics.last_run_unix.clone())).unwrap();

        metrics
    }

    pub fn render(&self) -> Result<String> {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .context("failed to encode metrics")
    }
}

/// Write the registry in text exposition format for the node_exporter textfile collector.
/// Goes through a temp file so the collector never reads a half-written file.
pub async fn write_textfile(path: &str) -> Result<()> {
    let metrics = get_metrics().await;
    metrics.last_run_unix.set(now_i64());
    let body = metrics.render()?;

    let target = Path::new(path);
    let tmp = target.with_extension("prom.tmp");
    tokio::fs::write(&tmp, body.as_bytes())
        .await
        .with_context(|| format!("failed to write metrics to {}", tmp.display()))?;
    tokio::fs::rename(&tmp, target)
        .await
        .with_context(|| format!("failed to move metrics into {}", target.display()))?;
    info!("metrics written to {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn textfile_contains_namespaced_counters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("role_exporter.prom");
        let metrics = get_metrics().await;
        metrics.users_listed.inc_by(2);
        metrics.api_requests.with_label_values(&["users", "200"]).inc();

        write_textfile(path.to_str().unwrap()).await.unwrap();

        let got = std::fs::read_to_string(&path).unwrap();
        assert!(got.contains("roleexporter_users_listed_total"));
        assert!(got.contains("roleexporter_api_requests_total{endpoint=\"users\",status=\"200\"}"));
        assert!(got.contains("roleexporter_last_run_timestamp_seconds"));
        assert!(!path.with_extension("prom.tmp").exists());
    }
}
