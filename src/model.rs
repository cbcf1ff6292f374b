//! Core data model: generation requests, results, feedback, and the
//! joined history view.
//!
//! Wire names are camelCase to match the external submission/result
//! contract; internal code uses snake_case fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scheduling priority of a generation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPriority {
    Urgent,
    High,
    Normal,
    Low,
}

/// How deep the research pipeline should go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResearchDepth {
    Basic,
    Standard,
    Comprehensive,
    DeepDive,
}

/// Lifecycle states. `Completed`, `Failed` and `Cancelled` are terminal:
/// once reached, no further transition occurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Received,
    Validated,
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Completed | RequestStatus::Failed | RequestStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Received => "received",
            RequestStatus::Validated => "validated",
            RequestStatus::Queued => "queued",
            RequestStatus::Processing => "processing",
            RequestStatus::Completed => "completed",
            RequestStatus::Failed => "failed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

/// Caller-supplied generation knobs. Everything beyond depth/count and
/// the feature flags is passed through to the agents untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    pub research_depth: ResearchDepth,
    pub maximum_ideas: u32,
    #[serde(default)]
    pub custom_criteria: Vec<String>,
    #[serde(default)]
    pub include_backtesting: bool,
    #[serde(default)]
    pub include_risk_analysis: bool,
    #[serde(default, rename = "includeESGFactors")]
    pub include_esg_factors: bool,
    #[serde(default)]
    pub investment_horizon: Option<String>,
    #[serde(default)]
    pub risk_tolerance: Option<String>,
}

/// Where to deliver the best-effort completion notification.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackConfig {
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// One user ask. Mutated in place as status advances; never deleted
/// within the process lifetime.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub id: String,
    pub user_id: String,
    pub parameters: GenerationParameters,
    pub priority: RequestPriority,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
    /// Seconds, computed at submission from the estimation formula
    pub estimated_processing_time: u64,
    /// Seconds, back-filled from metrics on completion
    #[serde(default)]
    pub actual_processing_time: Option<u64>,
    #[serde(default)]
    pub callback: Option<CallbackConfig>,
}

/// The payload the pipeline produces. The core treats its analytical
/// content as opaque.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentIdea {
    pub id: String,
    pub symbol: String,
    /// "long" | "short"
    pub direction: String,
    pub thesis: String,
    pub confidence: f64,
    #[serde(default)]
    pub time_horizon: Option<String>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub esg_notes: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesUsed {
    pub cpu_time: f64,
    pub memory_peak: u64,
    pub network_requests: u32,
    pub storage_operations: u32,
    pub estimated_cost: f64,
}

/// Per-model call and token accounting.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsageReport {
    pub model: String,
    pub calls: u32,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Timing breakdown and accounting for one pipeline run. Times in
/// seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingMetrics {
    pub total_processing_time: f64,
    pub model_execution_time: f64,
    pub data_retrieval_time: f64,
    pub validation_time: f64,
    pub resources_used: ResourcesUsed,
    pub models_used: Vec<ModelUsageReport>,
    pub data_sources_accessed: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub generation_method: String,
    pub research_sources: Vec<String>,
    pub quality_checks: Vec<String>,
    #[serde(default)]
    pub bias_assessment: Option<String>,
    /// Attached late by submit_feedback; the only mutation a stored
    /// result ever sees.
    #[serde(default)]
    pub user_feedback: Option<RequestFeedback>,
}

/// At most one per request id, created exactly when processing
/// succeeds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub request_id: String,
    pub status: RequestStatus,
    pub investment_ideas: Vec<InvestmentIdea>,
    pub processing_metrics: ProcessingMetrics,
    pub metadata: ResultMetadata,
    pub quality_score: f64,
    pub confidence_score: f64,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// User feedback on a finished request. Last write wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFeedback {
    pub id: String,
    pub request_id: String,
    pub user_id: String,
    /// 1..=5
    pub rating: u8,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub useful_ideas: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Wire shape of a submission. The caller supplies the id; status,
/// timestamps and the estimate are system-assigned.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    pub id: String,
    pub user_id: String,
    pub parameters: GenerationParameters,
    pub priority: RequestPriority,
    #[serde(default)]
    pub callback: Option<CallbackConfig>,
}

/// Wire shape of a feedback submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackInput {
    pub user_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub useful_ideas: Vec<String>,
}

/// Filters applied as independent intersecting predicates over a user's
/// requests.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilters {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<RequestPriority>,
    #[serde(default)]
    pub investment_horizon: Option<String>,
    #[serde(default)]
    pub risk_tolerance: Option<String>,
}

/// Request joined with its (possibly absent) result and feedback so the
/// caller does not need a second round trip.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub request_id: String,
    pub status: RequestStatus,
    pub priority: RequestPriority,
    pub submitted_at: DateTime<Utc>,
    pub estimated_processing_time: u64,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub idea_count: Option<usize>,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub user_rating: Option<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub requests: Vec<HistoryEntry>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub filters: HistoryFilters,
}
