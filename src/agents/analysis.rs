use serde::Deserialize;

use crate::agents::{parse_reply, Agent, AgentContext, RawIdea};
use crate::error::AgentError;
use crate::llm::Priority;
use crate::messages::{AgentMessage, AgentType, AnalysisOutcome, MessageContent};

pub struct AnalysisAgent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReply {
    #[serde(default)]
    candidate_ideas: Vec<RawIdea>,
}

impl Agent for AnalysisAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Analysis
    }

    fn system_prompt(&self) -> &str {
        r#"You are a Fundamental Analysis AI. Given research notes and generation parameters, produce concrete candidate investment ideas. Each idea must name a tradeable symbol, a direction, and a thesis grounded in the research.

Generate more candidates than the caller ultimately wants; weak ones are filtered downstream. Be specific: "long" or "short", a real ticker, a falsifiable thesis.

Output MUST be a valid JSON object with the following structure:
{
    "candidateIdeas": [
        {
            "symbol": "AAPL",
            "direction": "long" | "short",
            "thesis": "Your reasoning here...",
            "confidence": 0.0 to 1.0,
            "timeHorizon": "3-6 months",
            "sources": ["..."]
        }
    ]
}
"#
    }

    async fn process(
        &self,
        message: &AgentMessage,
        ctx: &AgentContext,
    ) -> Result<MessageContent, AgentError> {
        let request = match &message.content {
            MessageContent::AnalysisRequest(req) => req,
            other => return Err(self.unsupported(other)),
        };

        let query = format!(
            "Research notes:\n{}\n\nSources: {:?}\n\nTarget idea count: {} (generate a few extra)\nCustom criteria: {:?}",
            request.research.notes,
            request.research.sources,
            request.parameters.maximum_ideas,
            request.parameters.custom_criteria,
        );

        // Pipeline continuation: research already ran, keep the run moving
        let reply = ctx
            .ask(self.name(), self.system_prompt(), &query, Priority::High)
            .await?;

        let parsed: AnalysisReply = parse_reply(self.name(), &reply)?;
        if parsed.candidate_ideas.is_empty() {
            return Err(AgentError::MalformedResponse {
                agent: self.name().to_string(),
                reason: "no candidate ideas in reply".to_string(),
            });
        }

        Ok(MessageContent::AnalysisResponse(AnalysisOutcome {
            candidate_ideas: parsed
                .candidate_ideas
                .into_iter()
                .map(RawIdea::normalize)
                .collect(),
        }))
    }
}
