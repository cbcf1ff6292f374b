//! Custom error types for the idea generation system
//!
//! Provides structured, typed errors instead of generic Box<dyn Error>

use thiserror::Error;

/// Top-level lifecycle errors
#[derive(Error, Debug)]
pub enum IdeaError {
    #[error("Validation failed for request {request_id}: {reason}")]
    Validation { request_id: String, reason: String },

    #[error("Request not found: {request_id}")]
    RequestNotFound { request_id: String },

    #[error("Result not found for request: {request_id}")]
    ResultNotFound { request_id: String },

    #[error("Request {request_id} is already in terminal state {status}")]
    AlreadyTerminal { request_id: String, status: String },

    #[error("Orchestration failed at step {step}: {reason}")]
    Orchestration { step: String, reason: String },

    #[error("Processing timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Agent protocol errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("{agent} received unsupported request type: {content_type}")]
    UnsupportedRequestType { agent: String, content_type: String },

    #[error("{agent} expected a request envelope, got {message_type}")]
    NotARequest { agent: String, message_type: String },

    #[error("LLM call failed for {agent}: {reason}")]
    Llm { agent: String, reason: String },

    #[error("{agent} returned a malformed response: {reason}")]
    MalformedResponse { agent: String, reason: String },
}

impl From<String> for IdeaError {
    fn from(err: String) -> Self {
        IdeaError::Config(err)
    }
}

impl From<&str> for IdeaError {
    fn from(err: &str) -> Self {
        IdeaError::Config(err.to_string())
    }
}
