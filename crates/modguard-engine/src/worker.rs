//! Background worker pool draining the work queue

use crate::orchestrator::{Orchestrator, ProcessOutcome};
use crate::queue::JobReceiver;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Fixed set of tasks that run [`Orchestrator::process`] for queued ids
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` tasks on the current runtime
    pub fn spawn(orchestrator: Arc<Orchestrator>, receiver: JobReceiver, workers: usize) -> Self {
        let handles = (0..workers.max(1))
            .map(|worker| {
                let orchestrator = orchestrator.clone();
                let receiver = receiver.clone();
                tokio::spawn(run_worker(worker, orchestrator, receiver))
            })
            .collect::<Vec<_>>();

        info!("Started {} moderation workers", handles.len());
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit. Workers exit once the queue is closed
    /// and drained.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Moderation worker terminated abnormally: {}", e);
            }
        }
    }
}

async fn run_worker(worker: usize, orchestrator: Arc<Orchestrator>, receiver: JobReceiver) {
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(request_id) = next else {
            debug!(worker, "Work queue closed, worker exiting");
            break;
        };

        // Each job runs in its own task so a panic cannot skip `finish`
        // or take the worker down with it.
        let job = {
            let orchestrator = orchestrator.clone();
            let request_id = request_id.clone();
            tokio::spawn(async move { orchestrator.process(&request_id).await })
        };

        match job.await {
            Ok(Ok(ProcessOutcome::Completed { .. })) => {
                debug!(worker, request_id = %request_id, "Job finished");
            }
            Ok(Ok(ProcessOutcome::AlreadyCompleted)) => {
                debug!(worker, request_id = %request_id, "Job was a redelivery");
            }
            Ok(Err(e)) => {
                // Store failures leave the request pending for recovery.
                error!(worker, request_id = %request_id, "Moderation job failed: {}", e);
            }
            Err(e) => {
                error!(worker, request_id = %request_id, "Moderation job aborted: {}", e);
            }
        }

        orchestrator.queue().finish(&request_id);
    }
}
