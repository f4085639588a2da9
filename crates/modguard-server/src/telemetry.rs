//! Logging and metrics setup for the binary

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

/// Initialize tracing/logging
pub fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("modguard=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modguard=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Install the Prometheus recorder and return its render handle
pub fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "modguard_requests_submitted_total",
        "Moderation requests accepted, by content kind"
    );
    metrics::describe_counter!(
        "modguard_verdicts_total",
        "Completed verdicts by classification and source"
    );
    metrics::describe_counter!(
        "modguard_classifier_failures_total",
        "Classifier calls that failed and defaulted to safe"
    );
    metrics::describe_counter!(
        "modguard_alerts_total",
        "Alert channel attempts by channel and outcome"
    );
    metrics::describe_histogram!(
        "modguard_classifier_latency_ms",
        metrics::Unit::Milliseconds,
        "Classifier call latency in milliseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
