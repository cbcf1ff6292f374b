use serde::Deserialize;

use crate::agents::{parse_reply, Agent, AgentContext, RawIdea};
use crate::error::AgentError;
use crate::llm::Priority;
use crate::messages::{AgentMessage, AgentType, MessageContent, RiskAssessment};

pub struct RiskAgent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RiskReply {
    #[serde(default)]
    ideas: Vec<RawIdea>,
    #[serde(default)]
    notes: String,
}

impl Agent for RiskAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Risk
    }

    fn system_prompt(&self) -> &str {
        r#"You are a Risk Manager AI. Given candidate investment ideas and the caller's risk tolerance, assign each idea a risk level and drop any idea that is clearly outside the tolerance band.

RISK RULES:
1. Rate each idea "low", "medium" or "high" risk.
2. A "conservative" tolerance must not receive "high" risk ideas.
3. Concentrated single-catalyst theses are at least "medium" risk.
4. Keep an idea's symbol, direction and thesis unchanged; only annotate.

Output MUST be a valid JSON object with the following structure:
{
    "ideas": [ { "symbol": "...", "direction": "...", "thesis": "...", "confidence": 0.0, "riskLevel": "low" | "medium" | "high" } ],
    "notes": "Summary of the risk screen applied."
}
"#
    }

    async fn process(
        &self,
        message: &AgentMessage,
        ctx: &AgentContext,
    ) -> Result<MessageContent, AgentError> {
        let request = match &message.content {
            MessageContent::RiskRequest(req) => req,
            other => return Err(self.unsupported(other)),
        };

        let ideas_json =
            serde_json::to_string(&request.ideas).map_err(|e| AgentError::MalformedResponse {
                agent: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let query = format!(
            "Risk tolerance: {}\n\nCandidate ideas:\n{}",
            request.risk_tolerance.as_deref().unwrap_or("unspecified"),
            ideas_json,
        );

        let reply = ctx
            .ask(self.name(), self.system_prompt(), &query, Priority::High)
            .await?;

        let parsed: RiskReply = parse_reply(self.name(), &reply)?;

        Ok(MessageContent::RiskResponse(RiskAssessment {
            ideas: parsed.ideas.into_iter().map(RawIdea::normalize).collect(),
            notes: parsed.notes,
        }))
    }
}
