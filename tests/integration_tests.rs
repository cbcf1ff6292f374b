//! Integration tests for the idea generation system.
//! These tests verify that components work together correctly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use rust_ideagen::agents::{research::ResearchAgent, Agent, AgentContext};
use rust_ideagen::bus::EventBus;
use rust_ideagen::error::{AgentError, IdeaError};
use rust_ideagen::events::Event;
use rust_ideagen::llm::{LLMClient, LLMQueue};
use rust_ideagen::messages::{
    AgentMessage, AgentType, EvaluationRequest, MessageContent, MessageMetadata,
};
use rust_ideagen::model::{
    CallbackConfig, FeedbackInput, GenerationParameters, GenerationRequest, HistoryFilters,
    InvestmentIdea, ProcessingMetrics, RequestPriority, RequestStatus, ResearchDepth,
    ResultMetadata, SubmissionInput,
};
use rust_ideagen::services::callback::{CallbackDispatcher, CallbackPayload};
use rust_ideagen::services::lifecycle::RequestLifecycleManager;
use rust_ideagen::services::orchestrator::{GenerationOutcome, IdeaOrchestrator};
use rust_ideagen::services::tracking::RequestTracker;

struct CannedOrchestrator;

#[async_trait]
impl IdeaOrchestrator for CannedOrchestrator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome, IdeaError> {
        let ideas = vec![InvestmentIdea {
            id: "idea-1".to_string(),
            symbol: "NVDA".to_string(),
            direction: "long".to_string(),
            thesis: "datacenter capex cycle".to_string(),
            confidence: 0.9,
            time_horizon: Some("6-12 months".to_string()),
            risk_level: Some("medium".to_string()),
            esg_notes: None,
            sources: vec!["earnings calls".to_string()],
        }];
        assert!(ideas.len() <= request.parameters.maximum_ideas as usize);
        Ok(GenerationOutcome {
            ideas,
            metrics: ProcessingMetrics {
                total_processing_time: 7.0,
                ..Default::default()
            },
            metadata: ResultMetadata {
                generation_method: "canned".to_string(),
                ..Default::default()
            },
            quality_score: 0.92,
            confidence_score: 0.88,
        })
    }
}

fn manager_with_bus() -> (RequestLifecycleManager, EventBus) {
    let bus = EventBus::new(128);
    let manager = RequestLifecycleManager::new(
        Arc::new(CannedOrchestrator),
        RequestTracker::new(bus.clone()),
        CallbackDispatcher::new(1),
        30,
        7,
    );
    (manager, bus)
}

fn submission(id: &str) -> SubmissionInput {
    SubmissionInput {
        id: id.to_string(),
        user_id: "u1".to_string(),
        parameters: GenerationParameters {
            research_depth: ResearchDepth::Standard,
            maximum_ideas: 5,
            custom_criteria: Vec::new(),
            include_backtesting: false,
            include_risk_analysis: false,
            include_esg_factors: false,
            investment_horizon: Some("6-12 months".to_string()),
            risk_tolerance: Some("moderate".to_string()),
        },
        priority: RequestPriority::Normal,
        callback: None,
    }
}

async fn wait_for_completed(manager: &RequestLifecycleManager, id: &str) {
    for _ in 0..200 {
        if manager.get_request(id).map(|r| r.status) == Some(RequestStatus::Completed) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("request {id} never completed");
}

/// Submission to stored result, end to end over the lifecycle manager.
#[tokio::test]
async fn test_submit_to_result_flow() {
    let (manager, _bus) = manager_with_bus();

    let request = manager.submit_request(submission("r1")).unwrap();
    assert_eq!(request.estimated_processing_time, 85);

    wait_for_completed(&manager, "r1").await;

    let result = manager.get_request_results("r1", "u1").unwrap();
    assert_eq!(result.status, RequestStatus::Completed);
    assert_eq!(result.investment_ideas.len(), 1);
    assert_eq!(result.investment_ideas[0].symbol, "NVDA");
    assert_eq!(result.expires_at - result.generated_at, chrono::Duration::days(7));

    // Result storage counted as one storage operation.
    assert_eq!(result.processing_metrics.resources_used.storage_operations, 1);

    // History joins the result fields in one call.
    let history = manager.get_request_history("u1", None, None, HistoryFilters::default());
    assert_eq!(history.total, 1);
    assert_eq!(history.requests[0].idea_count, Some(1));
    assert_eq!(history.requests[0].quality_score, Some(0.92));
}

/// Status transitions are observable on the event bus as they happen.
#[tokio::test]
async fn test_tracking_events_broadcast_on_bus() {
    let (manager, bus) = manager_with_bus();
    let mut rx = bus.subscribe();

    manager.submit_request(submission("r1")).unwrap();
    wait_for_completed(&manager, "r1").await;

    let mut statuses = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::Status(s) = event {
            assert_eq!(s.request_id, "r1");
            statuses.push(s.status);
        }
    }
    assert_eq!(statuses.first(), Some(&RequestStatus::Received));
    assert_eq!(statuses.last(), Some(&RequestStatus::Completed));
}

/// A configured callback that cannot be delivered never affects the
/// stored result.
#[tokio::test]
async fn test_unreachable_callback_is_swallowed() {
    let (manager, _bus) = manager_with_bus();

    let mut input = submission("r1");
    input.callback = Some(CallbackConfig {
        // Nothing listens here; delivery fails fast and is logged only.
        url: "http://127.0.0.1:1/hook".to_string(),
        method: None,
        headers: Default::default(),
    });
    manager.submit_request(input).unwrap();
    wait_for_completed(&manager, "r1").await;

    let result = manager.get_request_results("r1", "u1").unwrap();
    assert_eq!(result.status, RequestStatus::Completed);
}

/// The callback payload is a summary, never the result body.
#[test]
fn test_callback_payload_is_a_summary() {
    let result = rust_ideagen::model::GenerationResult {
        request_id: "r1".to_string(),
        status: RequestStatus::Completed,
        investment_ideas: vec![InvestmentIdea {
            id: "idea-1".to_string(),
            symbol: "NVDA".to_string(),
            direction: "long".to_string(),
            thesis: "should not appear in the payload".to_string(),
            confidence: 0.9,
            time_horizon: None,
            risk_level: None,
            esg_notes: None,
            sources: Vec::new(),
        }],
        processing_metrics: ProcessingMetrics::default(),
        metadata: ResultMetadata::default(),
        quality_score: 0.92,
        confidence_score: 0.88,
        generated_at: chrono::Utc::now(),
        expires_at: chrono::Utc::now(),
    };

    let payload = CallbackPayload::from_result(&result);
    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(json["requestId"], "r1");
    assert_eq!(json["status"], "completed");
    assert_eq!(json["resultSummary"]["ideaCount"], 1);
    assert_eq!(json["resultSummary"]["qualityScore"], 0.92);
    assert!(json.get("investmentIdeas").is_none());
    assert!(!json.to_string().contains("should not appear"));
}

/// Feedback round trip through the public surface.
#[tokio::test]
async fn test_feedback_round_trip() {
    let (manager, _bus) = manager_with_bus();
    manager.submit_request(submission("r1")).unwrap();
    wait_for_completed(&manager, "r1").await;

    manager
        .submit_feedback(
            "r1",
            FeedbackInput {
                user_id: "u1".to_string(),
                rating: 5,
                comments: Some("actionable".to_string()),
                useful_ideas: vec!["idea-1".to_string()],
            },
        )
        .unwrap();

    let result = manager.get_request_results("r1", "u1").unwrap();
    let attached = result.metadata.user_feedback.unwrap();
    assert_eq!(attached.rating, 5);
    assert_eq!(attached.request_id, "r1");
}

/// An agent rejects a content tag it does not understand without ever
/// touching the LLM.
#[tokio::test]
async fn test_agent_rejects_unsupported_content() {
    let llm = LLMQueue::new(
        LLMClient::new(String::new(), None, "test-model".to_string()),
        1,
        8,
    );
    let ctx = AgentContext::new(llm);

    let envelope = AgentMessage::request(
        AgentType::Supervisor,
        AgentType::Research,
        MessageContent::EvaluationRequest(EvaluationRequest { ideas: Vec::new() }),
        MessageMetadata::new("r1", RequestPriority::Normal),
    );

    let err = ResearchAgent.handle_message(envelope, &ctx).await.unwrap_err();
    assert!(matches!(err, AgentError::UnsupportedRequestType { .. }));
}

/// A response envelope is never a valid agent input.
#[tokio::test]
async fn test_agent_rejects_response_envelopes() {
    let llm = LLMQueue::new(
        LLMClient::new(String::new(), None, "test-model".to_string()),
        1,
        8,
    );
    let ctx = AgentContext::new(llm);

    let request = AgentMessage::request(
        AgentType::Supervisor,
        AgentType::Research,
        MessageContent::EvaluationRequest(EvaluationRequest { ideas: Vec::new() }),
        MessageMetadata::new("r1", RequestPriority::Normal),
    );
    let response = AgentMessage::respond_to(
        &request,
        MessageContent::EvaluationRequest(EvaluationRequest { ideas: Vec::new() }),
    );

    let err = ResearchAgent.handle_message(response, &ctx).await.unwrap_err();
    assert!(matches!(err, AgentError::NotARequest { .. }));
}
