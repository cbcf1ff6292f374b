//! Unit tests for the request lifecycle state machine.
//!
//! The orchestrator is mocked so these tests exercise only the core:
//! submission, status transitions, cancellation, the terminal-state
//! guard, history pagination/filtering and feedback attachment.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::bus::EventBus;
use crate::error::IdeaError;
use crate::events::Event;
use crate::model::{
    FeedbackInput, GenerationParameters, HistoryFilters, InvestmentIdea, ProcessingMetrics,
    RequestPriority, RequestStatus, ResearchDepth, ResultMetadata, SubmissionInput,
};
use crate::services::callback::CallbackDispatcher;
use crate::services::lifecycle::RequestLifecycleManager;
use crate::services::orchestrator::{GenerationOutcome, IdeaOrchestrator};
use crate::services::tracking::RequestTracker;

/// Scripted stand-in for the agent pipeline.
struct MockOrchestrator {
    delay: Duration,
    fail: bool,
}

impl MockOrchestrator {
    fn instant() -> Self {
        Self {
            delay: Duration::from_millis(0),
            fail: false,
        }
    }

    fn slow() -> Self {
        Self {
            delay: Duration::from_secs(30),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            delay: Duration::from_millis(0),
            fail: true,
        }
    }
}

#[async_trait]
impl IdeaOrchestrator for MockOrchestrator {
    async fn generate(
        &self,
        request: &crate::model::GenerationRequest,
    ) -> Result<GenerationOutcome, IdeaError> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(IdeaError::Orchestration {
                step: "idea-generation".to_string(),
                reason: "pipeline blew up".to_string(),
            });
        }
        let count = request.parameters.maximum_ideas.min(3) as usize;
        let ideas = (0..count)
            .map(|i| InvestmentIdea {
                id: format!("idea-{i}"),
                symbol: format!("SYM{i}"),
                direction: "long".to_string(),
                thesis: "test thesis".to_string(),
                confidence: 0.8,
                time_horizon: None,
                risk_level: None,
                esg_notes: None,
                sources: Vec::new(),
            })
            .collect();
        Ok(GenerationOutcome {
            ideas,
            metrics: ProcessingMetrics {
                total_processing_time: 12.0,
                ..Default::default()
            },
            metadata: ResultMetadata {
                generation_method: "mock".to_string(),
                ..Default::default()
            },
            quality_score: 0.9,
            confidence_score: 0.85,
        })
    }
}

fn manager(orchestrator: MockOrchestrator) -> RequestLifecycleManager {
    let tracker = RequestTracker::new(EventBus::new(64));
    RequestLifecycleManager::new(
        Arc::new(orchestrator),
        tracker,
        CallbackDispatcher::new(1),
        60,
        7,
    )
}

fn submission(id: &str, user: &str) -> SubmissionInput {
    SubmissionInput {
        id: id.to_string(),
        user_id: user.to_string(),
        parameters: GenerationParameters {
            research_depth: ResearchDepth::Standard,
            maximum_ideas: 5,
            custom_criteria: Vec::new(),
            include_backtesting: false,
            include_risk_analysis: false,
            include_esg_factors: false,
            investment_horizon: None,
            risk_tolerance: None,
        },
        priority: RequestPriority::Normal,
        callback: None,
    }
}

async fn wait_for_status(m: &RequestLifecycleManager, id: &str, status: RequestStatus) {
    for _ in 0..200 {
        if m.get_request(id).map(|r| r.status) == Some(status) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "timed out waiting for {:?}, current: {:?}",
        status,
        m.get_request(id).map(|r| r.status)
    );
}

#[tokio::test]
async fn test_request_visible_immediately_after_submit() {
    let m = manager(MockOrchestrator::slow());
    let submitted = m.submit_request(submission("r1", "u1")).unwrap();
    assert_eq!(submitted.estimated_processing_time, 85);
    assert!(m.get_request("r1").is_some());
}

#[tokio::test]
async fn test_results_absent_until_completed_then_stable() {
    let m = manager(MockOrchestrator::instant());
    m.submit_request(submission("r1", "u1")).unwrap();
    assert!(m.get_request_results("r1", "u1").is_none() || {
        // the instant mock may already have finished; then status must
        // be completed
        m.get_request("r1").unwrap().status == RequestStatus::Completed
    });

    wait_for_status(&m, "r1", RequestStatus::Completed).await;

    let first = m.get_request_results("r1", "u1").expect("result stored");
    let second = m.get_request_results("r1", "u1").expect("result stable");
    assert_eq!(first, second);
    assert!(first.investment_ideas.len() <= 5);
    assert_eq!(first.expires_at - first.generated_at, chrono::Duration::days(7));

    let request = m.get_request("r1").unwrap();
    assert_eq!(request.actual_processing_time, Some(12));
}

#[tokio::test]
async fn test_cross_user_access_is_a_miss() {
    let m = manager(MockOrchestrator::instant());
    m.submit_request(submission("r1", "u1")).unwrap();
    wait_for_status(&m, "r1", RequestStatus::Completed).await;

    assert!(m.get_request_results("r1", "u2").is_none());
    assert!(m.get_request_results("r1", "u1").is_some());
}

#[tokio::test]
async fn test_failed_pipeline_marks_request_failed() {
    let m = manager(MockOrchestrator::failing());
    m.submit_request(submission("r1", "u1")).unwrap();
    wait_for_status(&m, "r1", RequestStatus::Failed).await;

    assert!(m.get_request_results("r1", "u1").is_none());

    // A critical, non-recoverable error tagged idea-generation was
    // recorded.
    let events = m.tracker().events_for("r1");
    let error = events
        .iter()
        .find_map(|e| match e {
            Event::Error(err) => Some(err),
            _ => None,
        })
        .expect("error event recorded");
    assert_eq!(error.step, "idea-generation");
    assert!(!error.recoverable);
}

#[tokio::test]
async fn test_timeout_fails_the_request() {
    let tracker = RequestTracker::new(EventBus::new(64));
    let m = RequestLifecycleManager::new(
        Arc::new(MockOrchestrator::slow()),
        tracker,
        CallbackDispatcher::new(1),
        0, // expire immediately
        7,
    );
    m.submit_request(submission("r1", "u1")).unwrap();
    wait_for_status(&m, "r1", RequestStatus::Failed).await;
}

#[tokio::test]
async fn test_cancel_processing_request() {
    let m = manager(MockOrchestrator::slow());
    m.submit_request(submission("r1", "u1")).unwrap();
    wait_for_status(&m, "r1", RequestStatus::Processing).await;

    assert!(m.cancel_request("r1", "u1"));
    assert_eq!(m.get_request("r1").unwrap().status, RequestStatus::Cancelled);

    // Second cancel is a no-op on a terminal request.
    assert!(!m.cancel_request("r1", "u1"));
}

#[tokio::test]
async fn test_cancel_rejects_wrong_owner_and_terminal_states() {
    let m = manager(MockOrchestrator::instant());
    m.submit_request(submission("r1", "u1")).unwrap();

    assert!(!m.cancel_request("r1", "intruder"));
    assert!(!m.cancel_request("missing", "u1"));

    wait_for_status(&m, "r1", RequestStatus::Completed).await;
    assert!(!m.cancel_request("r1", "u1"));
    assert_eq!(m.get_request("r1").unwrap().status, RequestStatus::Completed);
}

#[tokio::test]
async fn test_late_result_does_not_resurrect_cancelled_request() {
    let m = manager(MockOrchestrator::slow());
    m.submit_request(submission("r1", "u1")).unwrap();
    wait_for_status(&m, "r1", RequestStatus::Processing).await;
    assert!(m.cancel_request("r1", "u1"));

    // Simulate the in-flight task finishing anyway.
    let outcome = MockOrchestrator::instant()
        .generate(&m.get_request("r1").unwrap())
        .await
        .unwrap();
    m.store_results("r1", outcome).await;

    assert_eq!(m.get_request("r1").unwrap().status, RequestStatus::Cancelled);
    assert!(m.get_request_results("r1", "u1").is_none());

    // Same guard on the failure writer.
    m.mark_request_failed("r1", "late failure");
    assert_eq!(m.get_request("r1").unwrap().status, RequestStatus::Cancelled);
}

#[tokio::test]
async fn test_duplicate_request_id_is_a_validation_error() {
    let m = manager(MockOrchestrator::slow());
    m.submit_request(submission("r1", "u1")).unwrap();
    let err = m.submit_request(submission("r1", "u1")).unwrap_err();
    assert!(matches!(err, IdeaError::Validation { .. }));
}

#[tokio::test]
async fn test_validation_rejects_bad_input() {
    let m = manager(MockOrchestrator::slow());

    let mut no_user = submission("r1", "");
    no_user.user_id = String::new();
    assert!(m.submit_request(no_user).is_err());

    let mut zero_ideas = submission("r2", "u1");
    zero_ideas.parameters.maximum_ideas = 0;
    assert!(m.submit_request(zero_ideas).is_err());

    let mut too_many = submission("r3", "u1");
    too_many.parameters.maximum_ideas = 51;
    assert!(m.submit_request(too_many).is_err());

    let mut bad_callback = submission("r4", "u1");
    bad_callback.callback = Some(crate::model::CallbackConfig {
        url: "not a url".to_string(),
        method: None,
        headers: Default::default(),
    });
    assert!(m.submit_request(bad_callback).is_err());

    // Nothing was stored for any rejected submission.
    assert!(m.get_request("r2").is_none());
    assert!(m.get_request("r3").is_none());
    assert!(m.get_request("r4").is_none());
}

#[tokio::test]
async fn test_history_pagination_reconstructs_full_set() {
    let m = manager(MockOrchestrator::instant());
    for i in 0..5 {
        m.submit_request(submission(&format!("r{i}"), "u1")).unwrap();
        wait_for_status(&m, &format!("r{i}"), RequestStatus::Completed).await;
    }

    let limit = 2;
    let first = m.get_request_history("u1", Some(1), Some(limit), HistoryFilters::default());
    assert_eq!(first.total, 5);
    let pages = first.total.div_ceil(limit);
    assert_eq!(pages, 3);

    let mut seen: Vec<String> = Vec::new();
    for page in 1..=pages {
        let p = m.get_request_history("u1", Some(page), Some(limit), HistoryFilters::default());
        for entry in &p.requests {
            assert!(!seen.contains(&entry.request_id), "duplicate across pages");
            seen.push(entry.request_id.clone());
        }
    }
    assert_eq!(seen.len(), 5);

    // Sorted newest-first across the concatenation.
    let all = m.get_request_history("u1", Some(1), Some(10), HistoryFilters::default());
    for pair in all.requests.windows(2) {
        assert!(pair[0].submitted_at >= pair[1].submitted_at);
    }
    // Joined fields are present for completed requests.
    assert!(all.requests.iter().all(|e| e.idea_count == Some(3)));
}

#[tokio::test]
async fn test_history_filters_intersect() {
    let m = manager(MockOrchestrator::slow());
    let mut urgent = submission("r-urgent", "u1");
    urgent.priority = RequestPriority::Urgent;
    m.submit_request(urgent).unwrap();

    let mut low = submission("r-low", "u1");
    low.priority = RequestPriority::Low;
    low.parameters.investment_horizon = Some("5y".to_string());
    m.submit_request(low).unwrap();

    let by_priority = m.get_request_history(
        "u1",
        None,
        None,
        HistoryFilters {
            priority: Some(RequestPriority::Urgent),
            ..Default::default()
        },
    );
    assert_eq!(by_priority.total, 1);
    assert_eq!(by_priority.requests[0].request_id, "r-urgent");

    let by_horizon_and_priority = m.get_request_history(
        "u1",
        None,
        None,
        HistoryFilters {
            priority: Some(RequestPriority::Urgent),
            investment_horizon: Some("5y".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(by_horizon_and_priority.total, 0);

    // Other users see nothing.
    let other = m.get_request_history("u2", None, None, HistoryFilters::default());
    assert_eq!(other.total, 0);
}

#[tokio::test]
async fn test_feedback_before_result_lives_in_store_only() {
    let m = manager(MockOrchestrator::slow());
    m.submit_request(submission("r1", "u1")).unwrap();

    let feedback = m
        .submit_feedback(
            "r1",
            FeedbackInput {
                user_id: "u1".to_string(),
                rating: 4,
                comments: Some("looks promising".to_string()),
                useful_ideas: Vec::new(),
            },
        )
        .unwrap();
    assert_eq!(feedback.rating, 4);

    // No result yet, but the rating is joined into history.
    let history = m.get_request_history("u1", None, None, HistoryFilters::default());
    assert_eq!(history.requests[0].user_rating, Some(4));
}

#[tokio::test]
async fn test_feedback_after_result_is_attached_and_replaceable() {
    let m = manager(MockOrchestrator::instant());
    m.submit_request(submission("r1", "u1")).unwrap();
    wait_for_status(&m, "r1", RequestStatus::Completed).await;

    m.submit_feedback(
        "r1",
        FeedbackInput {
            user_id: "u1".to_string(),
            rating: 3,
            comments: None,
            useful_ideas: Vec::new(),
        },
    )
    .unwrap();

    let result = m.get_request_results("r1", "u1").unwrap();
    assert_eq!(result.metadata.user_feedback.as_ref().unwrap().rating, 3);

    // Last write wins.
    m.submit_feedback(
        "r1",
        FeedbackInput {
            user_id: "u1".to_string(),
            rating: 5,
            comments: Some("even better on reflection".to_string()),
            useful_ideas: vec!["idea-0".to_string()],
        },
    )
    .unwrap();
    let result = m.get_request_results("r1", "u1").unwrap();
    assert_eq!(result.metadata.user_feedback.as_ref().unwrap().rating, 5);
}

#[tokio::test]
async fn test_feedback_rejects_wrong_owner_and_bad_rating() {
    let m = manager(MockOrchestrator::slow());
    m.submit_request(submission("r1", "u1")).unwrap();

    let wrong_owner = m.submit_feedback(
        "r1",
        FeedbackInput {
            user_id: "u2".to_string(),
            rating: 4,
            comments: None,
            useful_ideas: Vec::new(),
        },
    );
    assert!(matches!(wrong_owner, Err(IdeaError::RequestNotFound { .. })));

    let bad_rating = m.submit_feedback(
        "r1",
        FeedbackInput {
            user_id: "u1".to_string(),
            rating: 6,
            comments: None,
            useful_ideas: Vec::new(),
        },
    );
    assert!(matches!(bad_rating, Err(IdeaError::Validation { .. })));
}

#[tokio::test]
async fn test_tracking_events_in_lifecycle_order() {
    let m = manager(MockOrchestrator::instant());
    m.submit_request(submission("r1", "u1")).unwrap();
    wait_for_status(&m, "r1", RequestStatus::Completed).await;

    let statuses: Vec<RequestStatus> = m
        .tracker()
        .events_for("r1")
        .into_iter()
        .filter_map(|e| match e {
            Event::Status(s) => Some(s.status),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            RequestStatus::Received,
            RequestStatus::Validated,
            RequestStatus::Queued,
            RequestStatus::Processing,
            RequestStatus::Completed,
        ]
    );
}
