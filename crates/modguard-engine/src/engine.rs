//! Running engine: orchestrator, worker pool and recovery sweeper

use crate::config::EngineConfig;
use crate::orchestrator::Orchestrator;
use crate::queue::WorkQueue;
use crate::recovery::RecoverySweeper;
use crate::worker::WorkerPool;
use modguard_alerts::AlertDispatcher;
use modguard_classifiers::{ClassifierClient, VerdictParser};
use modguard_store::ModerationStore;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Live moderation pipeline with its background tasks
pub struct ModerationEngine {
    orchestrator: Arc<Orchestrator>,
    workers: WorkerPool,
    sweeper: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl ModerationEngine {
    /// Wire the collaborators together and start background processing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        config: &EngineConfig,
        store: Arc<dyn ModerationStore>,
        classifier: Arc<dyn ClassifierClient>,
        parser: Arc<VerdictParser>,
        dispatcher: Arc<AlertDispatcher>,
    ) -> Self {
        let (queue, receiver) = WorkQueue::bounded(config.queue_capacity);

        let orchestrator = Arc::new(
            Orchestrator::new(store.clone(), classifier, parser, dispatcher, queue.clone())
                .with_classifier_deadline(config.classifier_deadline()),
        );

        let workers = WorkerPool::spawn(orchestrator.clone(), receiver, config.workers);

        let (shutdown, shutdown_rx) = watch::channel(false);
        let sweeper = RecoverySweeper::new(store, queue, config.stale_after(), config.recovery_batch)
            .spawn(config.recovery_interval(), shutdown_rx);

        info!(
            workers = workers.len(),
            queue_capacity = config.queue_capacity,
            "Moderation engine started"
        );

        Self {
            orchestrator,
            workers,
            sweeper,
            shutdown,
        }
    }

    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        self.orchestrator.clone()
    }

    /// Stop recovery, close the queue and wait for workers to drain it
    pub async fn shutdown(self) {
        info!("Shutting down moderation engine");
        let _ = self.shutdown.send(true);
        if let Err(e) = self.sweeper.await {
            warn!("Recovery sweeper terminated abnormally: {}", e);
        }

        self.orchestrator.queue().close();
        self.workers.join().await;
        info!("Moderation engine stopped");
    }
}
