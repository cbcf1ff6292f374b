//! Idea generation orchestration.
//!
//! Composes the analysis agents into one pipeline run per request,
//! entirely over message envelopes sharing a single conversation id.
//! The lifecycle manager only sees the `IdeaOrchestrator` trait, so the
//! whole pipeline can be swapped or mocked without touching the state
//! machine.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::agents::{
    analysis::AnalysisAgent, compliance::ComplianceAgent, evaluation::EvaluationAgent,
    research::ResearchAgent, risk::RiskAgent, synthesis::SynthesisAgent, Agent, AgentContext,
};
use crate::constants::steps;
use crate::error::IdeaError;
use crate::llm::LLMQueue;
use crate::messages::{
    AgentMessage, AgentType, AnalysisRequest, ComplianceRequest, EvaluationRequest,
    MessageContent, MessageMetadata, ResearchRequest, RiskRequest, SynthesisRequest,
};
use crate::model::{
    GenerationRequest, InvestmentIdea, ModelUsageReport, ProcessingMetrics, ResourcesUsed,
    ResultMetadata,
};
use crate::services::estimate;

/// Everything one successful pipeline run produces; the lifecycle
/// manager turns this into the stored `GenerationResult`.
#[derive(Clone, Debug)]
pub struct GenerationOutcome {
    pub ideas: Vec<InvestmentIdea>,
    pub metrics: ProcessingMetrics,
    pub metadata: ResultMetadata,
    pub quality_score: f64,
    pub confidence_score: f64,
}

#[async_trait]
pub trait IdeaOrchestrator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome, IdeaError>;
}

/// The real pipeline: research → analysis → (risk) → compliance →
/// synthesis → evaluation.
pub struct AgentOrchestrator {
    llm: LLMQueue,
}

impl AgentOrchestrator {
    pub fn new(llm: LLMQueue) -> Self {
        Self { llm }
    }

    fn envelope(
        recipient: AgentType,
        content: MessageContent,
        base: &MessageMetadata,
    ) -> AgentMessage {
        AgentMessage::request(
            AgentType::Supervisor,
            recipient,
            content,
            MessageMetadata {
                timestamp: Utc::now(),
                ..base.clone()
            },
        )
    }

    fn pipeline_error(reason: impl Into<String>) -> IdeaError {
        IdeaError::Orchestration {
            step: steps::IDEA_GENERATION.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl IdeaOrchestrator for AgentOrchestrator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome, IdeaError> {
        let started = Instant::now();
        let ctx = AgentContext::new(self.llm.clone());
        // One conversation id correlates every envelope in this run.
        let base = MessageMetadata::new(&request.id, request.priority);

        info!(
            "🧠 [ORCHESTRATOR] Starting pipeline for {} (conversation {})",
            request.id, base.conversation_id
        );

        // 1. Research
        let research_started = Instant::now();
        let reply = ResearchAgent
            .handle_message(
                Self::envelope(
                    AgentType::Research,
                    MessageContent::ResearchRequest(ResearchRequest {
                        parameters: request.parameters.clone(),
                    }),
                    &base,
                ),
                &ctx,
            )
            .await?;
        let research = match reply.content {
            MessageContent::ResearchResponse(findings) => findings,
            other => return Err(Self::pipeline_error(format!(
                "research agent returned {}",
                other.kind()
            ))),
        };
        let data_retrieval_time = research_started.elapsed().as_secs_f64();

        // 2. Fundamental analysis
        let reply = AnalysisAgent
            .handle_message(
                Self::envelope(
                    AgentType::Analysis,
                    MessageContent::AnalysisRequest(AnalysisRequest {
                        research: research.clone(),
                        parameters: request.parameters.clone(),
                    }),
                    &base,
                ),
                &ctx,
            )
            .await?;
        let mut ideas = match reply.content {
            MessageContent::AnalysisResponse(outcome) => outcome.candidate_ideas,
            other => return Err(Self::pipeline_error(format!(
                "analysis agent returned {}",
                other.kind()
            ))),
        };

        // 3. Risk screen (optional)
        if request.parameters.include_risk_analysis {
            let reply = RiskAgent
                .handle_message(
                    Self::envelope(
                        AgentType::Risk,
                        MessageContent::RiskRequest(RiskRequest {
                            ideas: ideas.clone(),
                            risk_tolerance: request.parameters.risk_tolerance.clone(),
                        }),
                        &base,
                    ),
                    &ctx,
                )
                .await?;
            ideas = match reply.content {
                MessageContent::RiskResponse(assessment) => assessment.ideas,
                other => return Err(Self::pipeline_error(format!(
                    "risk agent returned {}",
                    other.kind()
                ))),
            };
        }

        // 4. Compliance screen
        let reply = ComplianceAgent
            .handle_message(
                Self::envelope(
                    AgentType::Compliance,
                    MessageContent::ComplianceRequest(ComplianceRequest {
                        ideas: ideas.clone(),
                    }),
                    &base,
                ),
                &ctx,
            )
            .await?;
        let (ideas, compliance_flags) = match reply.content {
            MessageContent::ComplianceResponse(report) => (report.approved_ideas, report.flags),
            other => return Err(Self::pipeline_error(format!(
                "compliance agent returned {}",
                other.kind()
            ))),
        };
        if ideas.is_empty() {
            return Err(Self::pipeline_error(format!(
                "no ideas survived compliance screening ({} flagged)",
                compliance_flags.len()
            )));
        }

        // 5. Synthesis
        let reply = SynthesisAgent
            .handle_message(
                Self::envelope(
                    AgentType::Synthesis,
                    MessageContent::SynthesisRequest(SynthesisRequest {
                        ideas,
                        research: research.clone(),
                        maximum_ideas: request.parameters.maximum_ideas,
                    }),
                    &base,
                ),
                &ctx,
            )
            .await?;
        let synthesis = match reply.content {
            MessageContent::SynthesisResponse(outcome) => outcome,
            other => return Err(Self::pipeline_error(format!(
                "synthesis agent returned {}",
                other.kind()
            ))),
        };

        // 6. Evaluation
        let evaluation_started = Instant::now();
        let reply = EvaluationAgent
            .handle_message(
                Self::envelope(
                    AgentType::Evaluation,
                    MessageContent::EvaluationRequest(EvaluationRequest {
                        ideas: synthesis.ideas.clone(),
                    }),
                    &base,
                ),
                &ctx,
            )
            .await?;
        let evaluation = match reply.content {
            MessageContent::EvaluationResponse(report) => report,
            other => return Err(Self::pipeline_error(format!(
                "evaluation agent returned {}",
                other.kind()
            ))),
        };
        let validation_time = evaluation_started.elapsed().as_secs_f64();

        let usage = ctx.drain_usage();
        let total = started.elapsed().as_secs_f64();

        let mut models_used: Vec<ModelUsageReport> = Vec::new();
        for entry in &usage {
            match models_used.iter_mut().find(|m| m.model == entry.model) {
                Some(report) => {
                    report.calls += 1;
                    report.prompt_tokens += entry.prompt_tokens;
                    report.completion_tokens += entry.completion_tokens;
                }
                None => models_used.push(ModelUsageReport {
                    model: entry.model.clone(),
                    calls: 1,
                    prompt_tokens: entry.prompt_tokens,
                    completion_tokens: entry.completion_tokens,
                }),
            }
        }

        let mut quality_checks = evaluation.quality_checks;
        for flag in compliance_flags {
            quality_checks.push(format!("compliance: {}", flag));
        }

        info!(
            "🧠 [ORCHESTRATOR] Pipeline done for {}: {} ideas in {:.1}s",
            request.id,
            synthesis.ideas.len(),
            total
        );

        Ok(GenerationOutcome {
            ideas: synthesis.ideas,
            metrics: ProcessingMetrics {
                total_processing_time: total,
                model_execution_time: total - data_retrieval_time,
                data_retrieval_time,
                validation_time,
                resources_used: ResourcesUsed {
                    cpu_time: total,
                    memory_peak: 0,
                    network_requests: usage.len() as u32,
                    storage_operations: 0,
                    estimated_cost: estimate::estimate_cost(&request.parameters, request.priority),
                },
                models_used,
                data_sources_accessed: research.sources.clone(),
            },
            metadata: ResultMetadata {
                generation_method: synthesis.method,
                research_sources: research.sources,
                quality_checks,
                bias_assessment: evaluation.bias_assessment,
                user_feedback: None,
            },
            quality_score: evaluation.quality_score,
            confidence_score: evaluation.confidence_score,
        })
    }
}
