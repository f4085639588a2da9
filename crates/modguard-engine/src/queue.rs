//! Bounded work queue of request ids

use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Result of offering a request id to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    /// Accepted for processing
    Queued,
    /// Already queued or being processed
    Duplicate,
    /// Queue full; the request stays pending until a recovery sweep
    Full,
    /// Queue closed for shutdown
    Closed,
}

struct Shared {
    sender: RwLock<Option<mpsc::Sender<String>>>,
    in_flight: Mutex<HashSet<String>>,
}

/// Producer side of the work queue. Cheap to clone.
///
/// A request id is tracked from the moment it is queued until a worker
/// calls [`WorkQueue::finish`], so redelivery never runs two pipelines for
/// the same request at once.
#[derive(Clone)]
pub struct WorkQueue {
    shared: Arc<Shared>,
}

/// Consumer side, shared by the worker pool
pub type JobReceiver = Arc<tokio::sync::Mutex<mpsc::Receiver<String>>>;

impl WorkQueue {
    /// Create a queue with the given capacity
    pub fn bounded(capacity: usize) -> (Self, JobReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let queue = Self {
            shared: Arc::new(Shared {
                sender: RwLock::new(Some(tx)),
                in_flight: Mutex::new(HashSet::new()),
            }),
        };
        (queue, Arc::new(tokio::sync::Mutex::new(rx)))
    }

    /// Offer a request id without waiting
    pub fn enqueue(&self, request_id: &str) -> Enqueue {
        let guard = self.shared.sender.read();
        let Some(sender) = guard.as_ref() else {
            return Enqueue::Closed;
        };

        if !self.shared.in_flight.lock().insert(request_id.to_string()) {
            debug!(request_id, "Request already in flight");
            return Enqueue::Duplicate;
        }

        match sender.try_send(request_id.to_string()) {
            Ok(()) => Enqueue::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.shared.in_flight.lock().remove(request_id);
                warn!(request_id, "Work queue full, leaving request pending");
                Enqueue::Full
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.shared.in_flight.lock().remove(request_id);
                Enqueue::Closed
            }
        }
    }

    /// Release a request id once its job has finished
    pub fn finish(&self, request_id: &str) {
        self.shared.in_flight.lock().remove(request_id);
    }

    /// Whether a request id is queued or being processed
    pub fn is_in_flight(&self, request_id: &str) -> bool {
        self.shared.in_flight.lock().contains(request_id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.shared.in_flight.lock().len()
    }

    /// Stop accepting work. Jobs already queued are still delivered.
    pub fn close(&self) {
        self.shared.sender.write().take();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.sender.read().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_ids_are_rejected_until_finished() {
        let (queue, rx) = WorkQueue::bounded(4);

        assert_eq!(queue.enqueue("a"), Enqueue::Queued);
        assert_eq!(queue.enqueue("a"), Enqueue::Duplicate);

        let id = rx.lock().await.recv().await.unwrap();
        assert_eq!(id, "a");
        assert!(queue.is_in_flight("a"));

        queue.finish("a");
        assert_eq!(queue.enqueue("a"), Enqueue::Queued);
    }

    #[tokio::test]
    async fn test_full_queue_does_not_track_id() {
        let (queue, _rx) = WorkQueue::bounded(1);

        assert_eq!(queue.enqueue("a"), Enqueue::Queued);
        assert_eq!(queue.enqueue("b"), Enqueue::Full);
        assert!(!queue.is_in_flight("b"));
        assert_eq!(queue.in_flight_count(), 1);
    }

    #[tokio::test]
    async fn test_close_drains_then_ends() {
        let (queue, rx) = WorkQueue::bounded(4);
        queue.enqueue("a");
        queue.close();

        assert!(queue.is_closed());
        assert_eq!(queue.enqueue("b"), Enqueue::Closed);

        let mut rx = rx.lock().await;
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        assert_eq!(rx.recv().await, None);
    }
}
