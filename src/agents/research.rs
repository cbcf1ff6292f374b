use serde::Deserialize;

use crate::agents::{parse_reply, Agent, AgentContext};
use crate::error::AgentError;
use crate::messages::{AgentMessage, AgentType, MessageContent, ResearchFindings};

pub struct ResearchAgent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResearchReply {
    notes: String,
    #[serde(default)]
    sources: Vec<String>,
}

impl Agent for ResearchAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Research
    }

    fn system_prompt(&self) -> &str {
        r#"You are a Market Research AI. Given generation parameters (research depth, custom screening criteria, investment horizon, risk tolerance), gather the market themes, sectors and catalysts most relevant to generating investment ideas right now.

Scale the breadth of your research to the requested depth: "basic" means headline themes only, "deep-dive" means sector-level detail with named catalysts.

Output MUST be a valid JSON object with the following structure:
{
    "notes": "Your consolidated research notes here...",
    "sources": ["source name or publication", "..."]
}
"#
    }

    async fn process(
        &self,
        message: &AgentMessage,
        ctx: &AgentContext,
    ) -> Result<MessageContent, AgentError> {
        let request = match &message.content {
            MessageContent::ResearchRequest(req) => req,
            other => return Err(self.unsupported(other)),
        };

        let query = format!(
            "Research depth: {:?}\nCustom criteria: {:?}\nInvestment horizon: {}\nRisk tolerance: {}",
            request.parameters.research_depth,
            request.parameters.custom_criteria,
            request.parameters.investment_horizon.as_deref().unwrap_or("unspecified"),
            request.parameters.risk_tolerance.as_deref().unwrap_or("unspecified"),
        );

        let reply = ctx
            .ask(
                self.name(),
                self.system_prompt(),
                &query,
                message.metadata.priority.into(),
            )
            .await?;

        let parsed: ResearchReply = parse_reply(self.name(), &reply)?;

        Ok(MessageContent::ResearchResponse(ResearchFindings {
            notes: parsed.notes,
            sources: parsed.sources,
        }))
    }
}
