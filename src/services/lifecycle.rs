//! Request lifecycle manager — the core of the system.
//!
//! Owns the request/result/feedback stores and the state machine
//! `received → validated → queued → processing → {completed | failed}`,
//! with `cancelled` reachable from any non-terminal state. Terminal
//! states are absorbing: `store_results` and `mark_request_failed` are
//! no-ops once a request is terminal, so a late-finishing task can
//! never resurrect a cancelled request. The manager owns each request's
//! task handle, so cancellation also aborts in-flight work.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::constants::{lifecycle as limits, steps};
use crate::data::store::{FeedbackStore, RequestStore, ResultStore};
use crate::error::IdeaError;
use crate::events::ErrorSeverity;
use crate::model::{
    FeedbackInput, GenerationRequest, GenerationResult, HistoryEntry, HistoryFilters, HistoryPage,
    RequestFeedback, RequestStatus, SubmissionInput,
};
use crate::services::callback::CallbackDispatcher;
use crate::services::estimate;
use crate::services::orchestrator::{GenerationOutcome, IdeaOrchestrator};
use crate::services::tracking::RequestTracker;

#[derive(Clone)]
pub struct RequestLifecycleManager {
    requests: RequestStore,
    results: ResultStore,
    feedback: FeedbackStore,
    tracker: RequestTracker,
    orchestrator: Arc<dyn IdeaOrchestrator>,
    callbacks: CallbackDispatcher,
    /// One owned handle per in-flight request; cancel aborts it.
    tasks: Arc<DashMap<String, JoinHandle<()>>>,
    timeout: Duration,
    result_ttl_days: i64,
}

impl RequestLifecycleManager {
    pub fn new(
        orchestrator: Arc<dyn IdeaOrchestrator>,
        tracker: RequestTracker,
        callbacks: CallbackDispatcher,
        timeout_secs: u64,
        result_ttl_days: i64,
    ) -> Self {
        Self {
            requests: RequestStore::new(),
            results: ResultStore::new(),
            feedback: FeedbackStore::new(),
            tracker,
            orchestrator,
            callbacks,
            tasks: Arc::new(DashMap::new()),
            timeout: Duration::from_secs(timeout_secs),
            result_ttl_days,
        }
    }

    /// Validate and store a request, then schedule background
    /// processing. Returns synchronously; business-logic failures after
    /// this point surface only as a `failed` status.
    pub fn submit_request(&self, input: SubmissionInput) -> Result<GenerationRequest, IdeaError> {
        Self::validate_submission(&input)?;

        let estimated = estimate::estimate_processing_time(&input.parameters, input.priority);

        let request = GenerationRequest {
            id: input.id.clone(),
            user_id: input.user_id,
            parameters: input.parameters,
            priority: input.priority,
            status: RequestStatus::Received,
            submitted_at: Utc::now(),
            estimated_processing_time: estimated,
            actual_processing_time: None,
            callback: input.callback,
        };

        // Ids are unique for the process lifetime; a duplicate never
        // replaces the stored request.
        if !self.requests.insert(request.clone()) {
            return Err(IdeaError::Validation {
                request_id: input.id,
                reason: "request id already exists".to_string(),
            });
        }

        self.tracker
            .record_status(&request.id, &request.user_id, RequestStatus::Received);

        self.requests.transition(&request.id, RequestStatus::Validated);
        self.tracker
            .record_status(&request.id, &request.user_id, RequestStatus::Validated);
        self.tracker.record_step(
            &request.id,
            steps::VALIDATION,
            &format!("estimated {}s", estimated),
        );

        self.requests.transition(&request.id, RequestStatus::Queued);
        self.tracker
            .record_status(&request.id, &request.user_id, RequestStatus::Queued);
        self.tracker
            .record_step(&request.id, steps::QUEUEING, "scheduled for processing");

        let manager = self.clone();
        let task_request = request.clone();
        let handle = tokio::spawn(async move {
            manager.process_request(task_request).await;
        });
        self.tasks.insert(request.id.clone(), handle);

        info!(
            "📥 [LIFECYCLE] Request {} submitted by {} (eta {}s)",
            request.id, request.user_id, estimated
        );

        // Re-read so the caller sees the queued status.
        Ok(self.requests.get(&request.id).unwrap_or(request))
    }

    fn validate_submission(input: &SubmissionInput) -> Result<(), IdeaError> {
        let fail = |reason: &str| {
            Err(IdeaError::Validation {
                request_id: input.id.clone(),
                reason: reason.to_string(),
            })
        };

        if input.id.trim().is_empty() {
            return fail("request id must not be empty");
        }
        if input.user_id.trim().is_empty() {
            return fail("user id must not be empty");
        }
        if input.parameters.maximum_ideas == 0
            || input.parameters.maximum_ideas > limits::MAX_IDEAS_PER_REQUEST
        {
            return fail("maximumIdeas must be between 1 and 50");
        }
        if let Some(callback) = &input.callback {
            match Url::parse(&callback.url) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
                _ => return fail("callback url must be a valid http(s) URL"),
            }
        }
        Ok(())
    }

    /// The per-request background task. Single writer for this
    /// request's entry from here on.
    async fn process_request(&self, request: GenerationRequest) {
        // Cancelled between queueing and pickup: nothing to do.
        if self
            .requests
            .transition(&request.id, RequestStatus::Processing)
            .is_none()
        {
            self.tasks.remove(&request.id);
            return;
        }
        self.tracker
            .record_status(&request.id, &request.user_id, RequestStatus::Processing);
        self.tracker
            .record_step(&request.id, steps::IDEA_GENERATION, "pipeline started");

        let outcome = tokio::time::timeout(self.timeout, self.orchestrator.generate(&request)).await;

        match outcome {
            Err(_) => {
                let err = IdeaError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                };
                self.mark_request_failed(&request.id, &err.to_string());
            }
            Ok(Err(e)) => {
                self.mark_request_failed(&request.id, &e.to_string());
            }
            Ok(Ok(outcome)) => {
                self.store_results(&request.id, outcome).await;
            }
        }

        self.tasks.remove(&request.id);
    }

    /// Terminal-success writer. No-op if the request is already
    /// terminal (e.g. cancelled while the pipeline was finishing).
    pub async fn store_results(&self, request_id: &str, outcome: GenerationOutcome) {
        if self
            .requests
            .transition(request_id, RequestStatus::Completed)
            .is_none()
        {
            warn!(
                "📥 [LIFECYCLE] Dropping late result for {}: already terminal",
                request_id
            );
            return;
        }

        let generated_at = Utc::now();
        let mut metrics = outcome.metrics;
        metrics.resources_used.storage_operations += 1;
        let actual = metrics.total_processing_time.round() as u64;

        let result = GenerationResult {
            request_id: request_id.to_string(),
            status: RequestStatus::Completed,
            investment_ideas: outcome.ideas,
            processing_metrics: metrics,
            metadata: outcome.metadata,
            quality_score: outcome.quality_score,
            confidence_score: outcome.confidence_score,
            generated_at,
            expires_at: generated_at + chrono::Duration::days(self.result_ttl_days),
        };

        // Back-fill timing on the request before announcing completion.
        self.requests.update(request_id, |r| {
            r.actual_processing_time = Some(actual);
        });
        self.results.insert(result.clone());
        self.tracker
            .record_step(request_id, steps::RESULT_STORAGE, "result stored");

        let request = self.requests.get(request_id);
        if let Some(request) = &request {
            self.tracker
                .record_status(request_id, &request.user_id, RequestStatus::Completed);
        }

        // Best-effort, at-most-once, success path only.
        if let Some(callback) = request.and_then(|r| r.callback) {
            self.callbacks.dispatch(&callback, &result).await;
            self.tracker
                .record_step(request_id, steps::CALLBACK, "callback dispatched");
        }
    }

    /// Terminal-failure writer. No-op once terminal, same guard as
    /// `store_results`.
    pub fn mark_request_failed(&self, request_id: &str, error: &str) {
        if self
            .requests
            .transition(request_id, RequestStatus::Failed)
            .is_none()
        {
            warn!(
                "📥 [LIFECYCLE] Dropping late failure for {}: already terminal",
                request_id
            );
            return;
        }

        self.tracker.record_error(
            request_id,
            steps::IDEA_GENERATION,
            ErrorSeverity::Critical,
            error,
            false,
        );
        if let Some(request) = self.requests.get(request_id) {
            self.tracker
                .record_status(request_id, &request.user_id, RequestStatus::Failed);
        }
    }

    pub fn get_request(&self, request_id: &str) -> Option<GenerationRequest> {
        self.requests.get(request_id)
    }

    /// Ownership check is a hard boundary: cross-user access is a miss,
    /// never an authorization error.
    pub fn get_request_results(&self, request_id: &str, user_id: &str) -> Option<GenerationResult> {
        self.requests.get_owned(request_id, user_id)?;
        self.results.get(request_id)
    }

    /// True iff the request is owned by the caller and not yet
    /// terminal. Also aborts the in-flight task.
    pub fn cancel_request(&self, request_id: &str, user_id: &str) -> bool {
        if self.requests.get_owned(request_id, user_id).is_none() {
            return false;
        }
        match self.requests.transition(request_id, RequestStatus::Cancelled) {
            Some(_) => {
                if let Some((_, handle)) = self.tasks.remove(request_id) {
                    handle.abort();
                }
                self.tracker
                    .record_status(request_id, user_id, RequestStatus::Cancelled);
                info!("📥 [LIFECYCLE] Request {} cancelled by {}", request_id, user_id);
                true
            }
            None => false,
        }
    }

    /// Filtered, newest-first, paginated view of a user's requests,
    /// each joined with its (possibly absent) result and feedback.
    pub fn get_request_history(
        &self,
        user_id: &str,
        page: Option<usize>,
        limit: Option<usize>,
        filters: HistoryFilters,
    ) -> HistoryPage {
        let page = page.unwrap_or(limits::DEFAULT_PAGE).max(1);
        let limit = limit.unwrap_or(limits::DEFAULT_PAGE_LIMIT).max(1);

        let mut matching: Vec<GenerationRequest> = self
            .requests
            .for_user(user_id)
            .into_iter()
            .filter(|r| Self::matches(r, &filters))
            .collect();
        matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

        let total = matching.len();
        let entries = matching
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .map(|request| {
                let result = self.results.get(&request.id);
                let feedback = self.feedback.get(&request.id);
                HistoryEntry {
                    request_id: request.id,
                    status: request.status,
                    priority: request.priority,
                    submitted_at: request.submitted_at,
                    estimated_processing_time: request.estimated_processing_time,
                    completed_at: result.as_ref().map(|r| r.generated_at),
                    idea_count: result.as_ref().map(|r| r.investment_ideas.len()),
                    quality_score: result.as_ref().map(|r| r.quality_score),
                    user_rating: feedback.map(|f| f.rating),
                }
            })
            .collect();

        HistoryPage {
            requests: entries,
            total,
            page,
            limit,
            filters,
        }
    }

    fn matches(request: &GenerationRequest, filters: &HistoryFilters) -> bool {
        if let Some(status) = filters.status {
            if request.status != status {
                return false;
            }
        }
        if let Some(from) = filters.date_from {
            if request.submitted_at < from {
                return false;
            }
        }
        if let Some(to) = filters.date_to {
            if request.submitted_at > to {
                return false;
            }
        }
        if let Some(priority) = filters.priority {
            if request.priority != priority {
                return false;
            }
        }
        if let Some(horizon) = &filters.investment_horizon {
            if request.parameters.investment_horizon.as_ref() != Some(horizon) {
                return false;
            }
        }
        if let Some(tolerance) = &filters.risk_tolerance {
            if request.parameters.risk_tolerance.as_ref() != Some(tolerance) {
                return false;
            }
        }
        true
    }

    /// Store feedback (last write wins) and, when a result already
    /// exists, attach it into the result's metadata.
    pub fn submit_feedback(
        &self,
        request_id: &str,
        input: FeedbackInput,
    ) -> Result<RequestFeedback, IdeaError> {
        if self.requests.get_owned(request_id, &input.user_id).is_none() {
            return Err(IdeaError::RequestNotFound {
                request_id: request_id.to_string(),
            });
        }
        if input.rating < limits::MIN_RATING || input.rating > limits::MAX_RATING {
            return Err(IdeaError::Validation {
                request_id: request_id.to_string(),
                reason: "rating must be between 1 and 5".to_string(),
            });
        }

        let feedback = RequestFeedback {
            id: Uuid::new_v4().to_string(),
            request_id: request_id.to_string(),
            user_id: input.user_id,
            rating: input.rating,
            comments: input.comments,
            useful_ideas: input.useful_ideas,
            submitted_at: Utc::now(),
        };

        self.feedback.upsert(feedback.clone());
        if self.results.attach_feedback(request_id, feedback.clone()) {
            info!(
                "📥 [LIFECYCLE] Feedback for {} attached to stored result",
                request_id
            );
        }

        Ok(feedback)
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }
}
