//! Agent message envelope protocol.
//!
//! Every analysis agent receives work and returns results through the
//! same wrapper, so the orchestrator can treat them polymorphically and
//! each agent can be unit-tested by constructing envelopes directly.
//! `metadata.request_id` / `metadata.conversation_id` are carried
//! through unchanged on responses, which is what lets the caller
//! correlate fan-out without a shared session object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{GenerationParameters, InvestmentIdea, RequestPriority};

/// Agent-type tags used for sender/recipient routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Supervisor,
    Research,
    Analysis,
    Compliance,
    Risk,
    Synthesis,
    Evaluation,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Supervisor => "supervisor",
            AgentType::Research => "research",
            AgentType::Analysis => "analysis",
            AgentType::Compliance => "compliance",
            AgentType::Risk => "risk",
            AgentType::Synthesis => "synthesis",
            AgentType::Evaluation => "evaluation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Request,
    Response,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Request => "request",
            MessageType::Response => "response",
        }
    }
}

/// Correlation metadata attached to every envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    pub priority: RequestPriority,
    pub timestamp: DateTime<Utc>,
    pub conversation_id: String,
    pub request_id: String,
}

impl MessageMetadata {
    pub fn new(request_id: &str, priority: RequestPriority) -> Self {
        Self {
            priority,
            timestamp: Utc::now(),
            conversation_id: Uuid::new_v4().to_string(),
            request_id: request_id.to_string(),
        }
    }
}

// ---- Per-capability payloads -------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    pub parameters: GenerationParameters,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFindings {
    pub notes: String,
    pub sources: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub research: ResearchFindings,
    pub parameters: GenerationParameters,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub candidate_ideas: Vec<InvestmentIdea>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRequest {
    pub ideas: Vec<InvestmentIdea>,
    #[serde(default)]
    pub risk_tolerance: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub ideas: Vec<InvestmentIdea>,
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRequest {
    pub ideas: Vec<InvestmentIdea>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    /// Ideas that survived the screen
    pub approved_ideas: Vec<InvestmentIdea>,
    pub flags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub ideas: Vec<InvestmentIdea>,
    pub research: ResearchFindings,
    pub maximum_ideas: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisOutcome {
    pub ideas: Vec<InvestmentIdea>,
    pub method: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub ideas: Vec<InvestmentIdea>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub quality_score: f64,
    pub confidence_score: f64,
    pub quality_checks: Vec<String>,
    #[serde(default)]
    pub bias_assessment: Option<String>,
}

/// Tagged content union. The tag selects the request kind an agent
/// understands; any other tag is a contract violation on that agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessageContent {
    ResearchRequest(ResearchRequest),
    ResearchResponse(ResearchFindings),
    AnalysisRequest(AnalysisRequest),
    AnalysisResponse(AnalysisOutcome),
    RiskRequest(RiskRequest),
    RiskResponse(RiskAssessment),
    ComplianceRequest(ComplianceRequest),
    ComplianceResponse(ComplianceReport),
    SynthesisRequest(SynthesisRequest),
    SynthesisResponse(SynthesisOutcome),
    EvaluationRequest(EvaluationRequest),
    EvaluationResponse(EvaluationReport),
}

impl MessageContent {
    /// Wire tag of this content variant.
    pub fn kind(&self) -> &'static str {
        match self {
            MessageContent::ResearchRequest(_) => "research-request",
            MessageContent::ResearchResponse(_) => "research-response",
            MessageContent::AnalysisRequest(_) => "analysis-request",
            MessageContent::AnalysisResponse(_) => "analysis-response",
            MessageContent::RiskRequest(_) => "risk-request",
            MessageContent::RiskResponse(_) => "risk-response",
            MessageContent::ComplianceRequest(_) => "compliance-request",
            MessageContent::ComplianceResponse(_) => "compliance-response",
            MessageContent::SynthesisRequest(_) => "synthesis-request",
            MessageContent::SynthesisResponse(_) => "synthesis-response",
            MessageContent::EvaluationRequest(_) => "evaluation-request",
            MessageContent::EvaluationResponse(_) => "evaluation-response",
        }
    }
}

/// The uniform request/response wrapper.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    pub sender: AgentType,
    pub recipient: AgentType,
    pub message_type: MessageType,
    pub content: MessageContent,
    pub metadata: MessageMetadata,
}

impl AgentMessage {
    /// Build a request envelope addressed to `recipient`.
    pub fn request(
        sender: AgentType,
        recipient: AgentType,
        content: MessageContent,
        metadata: MessageMetadata,
    ) -> Self {
        Self {
            sender,
            recipient,
            message_type: MessageType::Request,
            content,
            metadata,
        }
    }

    /// Build the response to `request`: sender/recipient swapped,
    /// correlation metadata carried through unchanged.
    pub fn respond_to(request: &AgentMessage, content: MessageContent) -> Self {
        Self {
            sender: request.recipient,
            recipient: request.sender,
            message_type: MessageType::Response,
            content,
            metadata: request.metadata.clone(),
        }
    }
}
