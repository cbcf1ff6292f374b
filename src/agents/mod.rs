pub mod analysis;
pub mod compliance;
pub mod evaluation;
pub mod research;
pub mod risk;
pub mod synthesis;

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AgentError;
use crate::llm::{LLMQueue, Priority};
use crate::messages::{AgentMessage, MessageContent, MessageType};
use crate::messages::AgentType;
use crate::model::InvestmentIdea;

/// Per-model token accounting collected across one pipeline run.
#[derive(Clone, Debug)]
pub struct ModelUsage {
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Shared handle the orchestrator passes into every agent call: the LLM
/// queue plus a usage recorder drained into the result metrics.
#[derive(Clone)]
pub struct AgentContext {
    llm: LLMQueue,
    usage: Arc<Mutex<Vec<ModelUsage>>>,
}

impl AgentContext {
    pub fn new(llm: LLMQueue) -> Self {
        Self {
            llm,
            usage: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Send one chat request and record its token usage.
    pub async fn ask(
        &self,
        agent: &str,
        system_prompt: &str,
        query: &str,
        priority: Priority,
    ) -> Result<String, AgentError> {
        info!("🤖 [AGENT] Sending request to {}...", agent);
        let output = self
            .llm
            .chat(system_prompt, query, priority)
            .await
            .map_err(|e| AgentError::Llm {
                agent: agent.to_string(),
                reason: e.to_string(),
            })?;

        if let Ok(mut usage) = self.usage.lock() {
            usage.push(ModelUsage {
                model: output.model.clone(),
                prompt_tokens: output.usage.prompt_tokens,
                completion_tokens: output.usage.completion_tokens,
            });
        }

        Ok(output.content)
    }

    /// Take everything recorded so far.
    pub fn drain_usage(&self) -> Vec<ModelUsage> {
        match self.usage.lock() {
            Ok(mut usage) => std::mem::take(&mut *usage),
            Err(_) => Vec::new(),
        }
    }
}

pub trait Agent {
    fn agent_type(&self) -> AgentType;

    fn name(&self) -> &'static str {
        self.agent_type().as_str()
    }

    fn system_prompt(&self) -> &str;

    /// Turn an accepted request payload into a response payload. A
    /// content tag the agent does not understand must come back as
    /// `AgentError::UnsupportedRequestType`.
    async fn process(
        &self,
        message: &AgentMessage,
        ctx: &AgentContext,
    ) -> Result<MessageContent, AgentError>;

    /// Uniform entry point: validates the envelope, delegates to
    /// `process`, and wraps the result with sender/recipient swapped and
    /// correlation metadata carried through.
    async fn handle_message(
        &self,
        message: AgentMessage,
        ctx: &AgentContext,
    ) -> Result<AgentMessage, AgentError> {
        if message.message_type != MessageType::Request {
            return Err(AgentError::NotARequest {
                agent: self.name().to_string(),
                message_type: message.message_type.as_str().to_string(),
            });
        }

        let content = self.process(&message, ctx).await?;
        Ok(AgentMessage::respond_to(&message, content))
    }

    /// The standard rejection for a content tag this agent does not
    /// accept.
    fn unsupported(&self, content: &MessageContent) -> AgentError {
        AgentError::UnsupportedRequestType {
            agent: self.name().to_string(),
            content_type: content.kind().to_string(),
        }
    }
}

/// Parse the JSON object out of an LLM reply, tolerating prose or code
/// fences around it.
pub(crate) fn parse_reply<T: DeserializeOwned>(agent: &str, reply: &str) -> Result<T, AgentError> {
    let start = reply.find('{');
    let end = reply.rfind('}');

    let json = match (start, end) {
        (Some(s), Some(e)) if e > s => &reply[s..=e],
        _ => {
            return Err(AgentError::MalformedResponse {
                agent: agent.to_string(),
                reason: "no JSON object in reply".to_string(),
            })
        }
    };

    serde_json::from_str(json).map_err(|e| AgentError::MalformedResponse {
        agent: agent.to_string(),
        reason: e.to_string(),
    })
}

/// Loosely-typed idea as LLMs tend to emit it; normalized before it
/// enters the pipeline.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawIdea {
    #[serde(default)]
    pub id: Option<String>,
    pub symbol: String,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub thesis: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub time_horizon: Option<String>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub esg_notes: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl RawIdea {
    pub fn normalize(self) -> InvestmentIdea {
        InvestmentIdea {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            symbol: self.symbol,
            direction: self.direction.unwrap_or_else(|| "long".to_string()),
            thesis: self.thesis.unwrap_or_default(),
            confidence: self.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
            time_horizon: self.time_horizon,
            risk_level: self.risk_level,
            esg_notes: self.esg_notes,
            sources: self.sources,
        }
    }
}
