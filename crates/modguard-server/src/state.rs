//! Shared application state

use metrics_exporter_prometheus::PrometheusHandle;
use modguard_engine::Orchestrator;
use modguard_store::ModerationStore;
use std::sync::Arc;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub store: Arc<dyn ModerationStore>,

    /// Prometheus handle for `/metrics`; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,

    /// Maximum request body size in bytes
    pub body_limit: usize,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, body_limit: usize) -> Self {
        Self {
            store: orchestrator.store().clone(),
            orchestrator,
            metrics: None,
            body_limit,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
