use serde::Deserialize;

use crate::agents::{parse_reply, Agent, AgentContext, RawIdea};
use crate::error::AgentError;
use crate::llm::Priority;
use crate::messages::{AgentMessage, AgentType, ComplianceReport, MessageContent};

pub struct ComplianceAgent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComplianceReply {
    #[serde(default)]
    approved_ideas: Vec<RawIdea>,
    #[serde(default)]
    flags: Vec<String>,
}

impl Agent for ComplianceAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Compliance
    }

    fn system_prompt(&self) -> &str {
        r#"You are a Compliance Screening AI. Given candidate investment ideas, remove any idea that a retail-facing advisory product could not surface: sanctioned issuers, delisted or untradeable instruments, theses resting on material non-public information, or prohibited concentrated leverage.

Pass everything else through UNCHANGED. For each removal, record a short flag naming the idea and the rule it violated.

Output MUST be a valid JSON object with the following structure:
{
    "approvedIdeas": [ { "symbol": "...", "direction": "...", "thesis": "...", "confidence": 0.0 } ],
    "flags": ["SYMB: reason for removal", "..."]
}
"#
    }

    async fn process(
        &self,
        message: &AgentMessage,
        ctx: &AgentContext,
    ) -> Result<MessageContent, AgentError> {
        let request = match &message.content {
            MessageContent::ComplianceRequest(req) => req,
            other => return Err(self.unsupported(other)),
        };

        let ideas_json =
            serde_json::to_string(&request.ideas).map_err(|e| AgentError::MalformedResponse {
                agent: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let query = format!("Candidate ideas:\n{}", ideas_json);

        let reply = ctx
            .ask(self.name(), self.system_prompt(), &query, Priority::High)
            .await?;

        let parsed: ComplianceReply = parse_reply(self.name(), &reply)?;

        Ok(MessageContent::ComplianceResponse(ComplianceReport {
            approved_ideas: parsed
                .approved_ideas
                .into_iter()
                .map(RawIdea::normalize)
                .collect(),
            flags: parsed.flags,
        }))
    }
}
