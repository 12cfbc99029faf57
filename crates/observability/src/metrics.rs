//! Prometheus metrics infrastructure
//!
//! The exporter is optional; when it is not installed the counters are
//! no-ops, so services record unconditionally.

use metrics::{counter, histogram, Counter, Histogram};
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus exporter on `/metrics` at the given port
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Metrics for the analysis pipeline.
///
/// # Metrics
///
/// * `analyses_triggered_total` - Requests accepted by the orchestrator
/// * `analyses_completed_total` - Requests that reached COMPLETED
/// * `analyses_failed_total` - Requests that reached FAILED
/// * `fetch_timeouts_total` - Correlated fetches that hit the deadline
/// * `analysis_duration_seconds` - End-to-end per-request duration
#[derive(Clone)]
pub struct PipelineMetrics {
    triggered: Counter,
    completed: Counter,
    failed: Counter,
    fetch_timeouts: Counter,
    duration: Histogram,
    service_name: String,
}

impl PipelineMetrics {
    /// Create metrics labelled with the recording service's name
    pub fn new(service_name: &str) -> Self {
        let name = service_name.to_string();
        Self {
            triggered: counter!("analyses_triggered_total", "service" => name.clone()),
            completed: counter!("analyses_completed_total", "service" => name.clone()),
            failed: counter!("analyses_failed_total", "service" => name.clone()),
            fetch_timeouts: counter!("fetch_timeouts_total", "service" => name.clone()),
            duration: histogram!("analysis_duration_seconds", "service" => name.clone()),
            service_name: name,
        }
    }

    pub fn record_triggered(&self) {
        self.triggered.increment(1);
    }

    pub fn record_completed(&self, duration: Duration) {
        self.completed.increment(1);
        self.duration.record(duration.as_secs_f64());
    }

    pub fn record_failed(&self, duration: Duration) {
        self.failed.increment(1);
        self.duration.record(duration.as_secs_f64());
    }

    pub fn record_fetch_timeout(&self) {
        self.fetch_timeouts.increment(1);
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}
