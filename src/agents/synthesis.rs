use serde::Deserialize;

use crate::agents::{parse_reply, Agent, AgentContext, RawIdea};
use crate::error::AgentError;
use crate::llm::Priority;
use crate::messages::{AgentMessage, AgentType, MessageContent, SynthesisOutcome};

pub struct SynthesisAgent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisReply {
    #[serde(default)]
    ideas: Vec<RawIdea>,
    #[serde(default)]
    method: Option<String>,
}

impl Agent for SynthesisAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Synthesis
    }

    fn system_prompt(&self) -> &str {
        r#"You are an Idea Synthesis AI. Given screened candidate ideas and the original research notes, merge near-duplicates, rank by conviction, and return the strongest ideas up to the requested count. Tighten each surviving thesis into two or three sentences a portfolio manager could act on.

Output MUST be a valid JSON object with the following structure:
{
    "ideas": [ { "symbol": "...", "direction": "...", "thesis": "...", "confidence": 0.0, "riskLevel": "...", "timeHorizon": "..." } ],
    "method": "one line describing how you ranked and merged"
}
"#
    }

    async fn process(
        &self,
        message: &AgentMessage,
        ctx: &AgentContext,
    ) -> Result<MessageContent, AgentError> {
        let request = match &message.content {
            MessageContent::SynthesisRequest(req) => req,
            other => return Err(self.unsupported(other)),
        };

        let ideas_json =
            serde_json::to_string(&request.ideas).map_err(|e| AgentError::MalformedResponse {
                agent: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let query = format!(
            "Return at most {} ideas.\n\nScreened candidates:\n{}\n\nResearch notes:\n{}",
            request.maximum_ideas, ideas_json, request.research.notes,
        );

        let reply = ctx
            .ask(self.name(), self.system_prompt(), &query, Priority::High)
            .await?;

        let parsed: SynthesisReply = parse_reply(self.name(), &reply)?;

        let mut ideas: Vec<_> = parsed.ideas.into_iter().map(RawIdea::normalize).collect();
        // The model is told the cap, but the contract is enforced here.
        ideas.truncate(request.maximum_ideas as usize);

        Ok(MessageContent::SynthesisResponse(SynthesisOutcome {
            ideas,
            method: parsed
                .method
                .unwrap_or_else(|| "multi-agent-pipeline".to_string()),
        }))
    }
}
