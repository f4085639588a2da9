//! Moderation orchestrator
//!
//! Owns the per-request pipeline:
//!
//! ```text
//! submit:  validate -> persist pending -> enqueue
//! process: load -> classify -> parse -> persist result -> mark completed
//!          -> (flagged) dispatch alerts -> persist notification log
//! ```
//!
//! Every stage commits on its own, so a crash between stages leaves a
//! pending request that the recovery sweeper can pick up again.

use crate::error::{EngineError, EngineResult};
use crate::queue::{Enqueue, WorkQueue};
use modguard_alerts::{Alert, AlertDispatcher, DispatchOutcome};
use modguard_classifiers::{failure_verdict, ClassificationRequest, ClassifierClient, ClassifierError, VerdictParser};
use modguard_core::{
    ContentKind, Error, ModerationRequest, ModerationResult, NotificationLog, VerdictSource,
};
use modguard_store::ModerationStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Outer bound on a single classifier call, on top of the client's own timeout
pub const DEFAULT_CLASSIFIER_DEADLINE: Duration = Duration::from_secs(60);

/// Prefix stored as the raw response when the classifier call failed
pub const CLASSIFIER_ERROR_PREFIX: &str = "Error calling classifier";

/// Accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub request_id: String,

    /// What happened when the request was offered to the work queue
    pub enqueue: Enqueue,
}

/// What `process` did for one request
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Request was already completed; nothing to do
    AlreadyCompleted,

    /// Request reached `completed` during this call
    Completed {
        result: ModerationResult,

        /// Log row written by this call, if alerts were dispatched
        notification: Option<NotificationLog>,
    },
}

impl ProcessOutcome {
    pub fn result(&self) -> Option<&ModerationResult> {
        match self {
            Self::AlreadyCompleted => None,
            Self::Completed { result, .. } => Some(result),
        }
    }
}

/// Drives moderation requests from submission to a terminal verdict
pub struct Orchestrator {
    store: Arc<dyn ModerationStore>,
    classifier: Arc<dyn ClassifierClient>,
    parser: Arc<VerdictParser>,
    dispatcher: Arc<AlertDispatcher>,
    queue: WorkQueue,
    classifier_deadline: Duration,
}

impl Orchestrator {
    /// Create an orchestrator over injected collaborators
    pub fn new(
        store: Arc<dyn ModerationStore>,
        classifier: Arc<dyn ClassifierClient>,
        parser: Arc<VerdictParser>,
        dispatcher: Arc<AlertDispatcher>,
        queue: WorkQueue,
    ) -> Self {
        Self {
            store,
            classifier,
            parser,
            dispatcher,
            queue,
            classifier_deadline: DEFAULT_CLASSIFIER_DEADLINE,
        }
    }

    pub fn with_classifier_deadline(mut self, deadline: Duration) -> Self {
        self.classifier_deadline = deadline;
        self
    }

    pub fn store(&self) -> &Arc<dyn ModerationStore> {
        &self.store
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    /// Persist a pending request and schedule it for processing.
    ///
    /// Returns as soon as the request is durable; never waits on the
    /// classifier. A full queue is not an error: the request stays pending
    /// and is recovered by the next sweep.
    #[instrument(skip(self, user_id, kind, content), fields(kind = %kind, bytes = content.len()))]
    pub async fn submit(
        &self,
        user_id: &str,
        kind: ContentKind,
        media_type: &str,
        content: Vec<u8>,
    ) -> EngineResult<Submission> {
        validate_submission(user_id, kind, media_type, &content)?;

        let request = ModerationRequest::new(user_id, kind, media_type, content);
        self.store.insert_request(&request).await?;

        metrics::counter!("modguard_requests_submitted_total", "kind" => kind.as_str())
            .increment(1);

        let enqueue = self.queue.enqueue(&request.id);
        info!(
            request_id = %request.id,
            fingerprint = %request.fingerprint,
            ?enqueue,
            "Moderation request accepted"
        );

        Ok(Submission {
            request_id: request.id,
            enqueue,
        })
    }

    /// Submit UTF-8 text
    pub async fn submit_text(&self, user_id: &str, text: &str) -> EngineResult<Submission> {
        self.submit(user_id, ContentKind::Text, "text/plain", text.as_bytes().to_vec())
            .await
    }

    /// Submit an image with its declared media type
    pub async fn submit_image(
        &self,
        user_id: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> EngineResult<Submission> {
        self.submit(user_id, ContentKind::Image, media_type, bytes).await
    }

    /// Run the pipeline for one request.
    ///
    /// Safe to call more than once for the same id: a completed request is
    /// skipped, and a pending request that already has a result is only
    /// finished, never re-classified.
    #[instrument(skip(self))]
    pub async fn process(&self, request_id: &str) -> EngineResult<ProcessOutcome> {
        let request = self
            .store
            .get_request(request_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(request_id.to_string()))?;

        if !request.is_pending() {
            debug!("Request already completed");
            return Ok(ProcessOutcome::AlreadyCompleted);
        }

        let result = match self.store.get_result(request_id).await? {
            Some(existing) => {
                info!("Resuming request with existing result");
                existing
            }
            None => {
                let fresh = self.classify(&request).await;
                if self.store.insert_result(&fresh).await? {
                    fresh
                } else {
                    // Lost a race with another delivery; keep what is stored.
                    self.store
                        .get_result(request_id)
                        .await?
                        .ok_or_else(|| EngineError::NotFound(request_id.to_string()))?
                }
            }
        };

        self.store.mark_completed(request_id).await?;

        metrics::counter!(
            "modguard_verdicts_total",
            "classification" => result.verdict.classification.as_str(),
            "source" => result.source.as_str()
        )
        .increment(1);

        info!(
            classification = %result.verdict.classification,
            confidence = result.verdict.confidence,
            source = %result.source,
            "Moderation completed"
        );

        let notification = if result.is_flagged() {
            self.alert(&request, &result).await?
        } else {
            None
        };

        Ok(ProcessOutcome::Completed {
            result,
            notification,
        })
    }

    /// Call the classifier and turn whatever comes back into a result
    async fn classify(&self, request: &ModerationRequest) -> ModerationResult {
        let call = ClassificationRequest::for_request(request);
        let started = Instant::now();

        let response = match tokio::time::timeout(
            self.classifier_deadline,
            call.send(self.classifier.as_ref()),
        )
        .await
        {
            Ok(response) => response,
            Err(_) => Err(ClassifierError::Timeout(self.classifier_deadline)),
        };

        metrics::histogram!("modguard_classifier_latency_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);

        match response {
            Ok(raw) => {
                let parsed = self.parser.parse(&raw);
                let source = parsed.source();
                let verdict = parsed.into_verdict().clamped();
                ModerationResult::new(&request.id, verdict, source, raw)
            }
            Err(err) => {
                metrics::counter!("modguard_classifier_failures_total").increment(1);
                warn!(
                    classifier = self.classifier.name(),
                    error = %err,
                    "Classifier call failed, defaulting to safe"
                );
                let message = err.to_string();
                ModerationResult::new(
                    &request.id,
                    failure_verdict(&message),
                    VerdictSource::Failure,
                    format!("{}: {}", CLASSIFIER_ERROR_PREFIX, message),
                )
            }
        }
    }

    /// Dispatch alerts for a flagged result unless a log row already exists
    async fn alert(
        &self,
        request: &ModerationRequest,
        result: &ModerationResult,
    ) -> EngineResult<Option<NotificationLog>> {
        if !self.store.notifications_for(&request.id).await?.is_empty() {
            debug!("Alerts already dispatched");
            return Ok(None);
        }

        let alert = Alert::new(
            &request.user_id,
            request.kind,
            &request.fingerprint,
            &result.raw_response,
        );
        let outcome: DispatchOutcome = self.dispatcher.dispatch(alert).await;

        let mut log = NotificationLog::new(&request.id, outcome.label(), outcome.status());
        log.id = Some(self.store.insert_notification(&log).await?);

        info!(
            channel = %log.channel,
            status = %log.status,
            failures = outcome.failures(),
            "Alert dispatch recorded"
        );

        Ok(Some(log))
    }
}

fn validate_submission(
    user_id: &str,
    kind: ContentKind,
    media_type: &str,
    content: &[u8],
) -> Result<(), Error> {
    if user_id.trim().is_empty() {
        return Err(Error::invalid_value("user_id", user_id));
    }
    if content.is_empty() {
        return Err(Error::invalid_content("content is empty"));
    }
    match kind {
        ContentKind::Text => {
            let text = std::str::from_utf8(content)
                .map_err(|_| Error::invalid_content("text is not valid UTF-8"))?;
            if text.trim().is_empty() {
                return Err(Error::invalid_content("text is blank"));
            }
        }
        ContentKind::Image => {
            if !media_type.to_ascii_lowercase().starts_with("image/") {
                return Err(Error::invalid_value("media_type", media_type));
            }
        }
    }
    Ok(())
}
