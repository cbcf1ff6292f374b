use serde::Deserialize;

use crate::agents::{parse_reply, Agent, AgentContext};
use crate::error::AgentError;
use crate::llm::Priority;
use crate::messages::{AgentMessage, AgentType, EvaluationReport, MessageContent};

pub struct EvaluationAgent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationReply {
    quality_score: f64,
    confidence_score: f64,
    #[serde(default)]
    quality_checks: Vec<String>,
    #[serde(default)]
    bias_assessment: Option<String>,
}

impl Agent for EvaluationAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Evaluation
    }

    fn system_prompt(&self) -> &str {
        r#"You are an Idea Quality Evaluation AI. Given a final set of investment ideas, score the batch as a whole.

SCORING:
1. qualityScore 0.0-1.0: thesis specificity, falsifiability, diversity across sectors.
2. confidenceScore 0.0-1.0: aggregate of per-idea confidence weighted by thesis strength.
3. List the quality checks you applied by name.
4. Assess the batch for systematic bias (sector crowding, recency bias, one-directional tilt).

Output MUST be a valid JSON object with the following structure:
{
    "qualityScore": 0.0 to 1.0,
    "confidenceScore": 0.0 to 1.0,
    "qualityChecks": ["check name", "..."],
    "biasAssessment": "One or two sentences."
}
"#
    }

    async fn process(
        &self,
        message: &AgentMessage,
        ctx: &AgentContext,
    ) -> Result<MessageContent, AgentError> {
        let request = match &message.content {
            MessageContent::EvaluationRequest(req) => req,
            other => return Err(self.unsupported(other)),
        };

        let ideas_json =
            serde_json::to_string(&request.ideas).map_err(|e| AgentError::MalformedResponse {
                agent: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let query = format!("Final ideas:\n{}", ideas_json);

        let reply = ctx
            .ask(self.name(), self.system_prompt(), &query, Priority::High)
            .await?;

        let parsed: EvaluationReply = parse_reply(self.name(), &reply)?;

        Ok(MessageContent::EvaluationResponse(EvaluationReport {
            quality_score: parsed.quality_score.clamp(0.0, 1.0),
            confidence_score: parsed.confidence_score.clamp(0.0, 1.0),
            quality_checks: parsed.quality_checks,
            bias_assessment: parsed.bias_assessment,
        }))
    }
}
