//! IdeaGen - asynchronous investment idea generation
//!
//! This library provides the core request lifecycle machinery: a state
//! machine that takes a generation request from submission through a
//! multi-agent analysis pipeline to a stored result and an optional
//! best-effort callback.

pub mod agents;
pub mod api;
pub mod bus;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod events;
pub mod llm;
pub mod messages;
pub mod model;
pub mod services;

// Re-export commonly used types
pub use bus::EventBus;
pub use config::AppConfig;
pub use error::{AgentError, IdeaError};
pub use messages::{AgentMessage, AgentType, MessageContent, MessageType};
pub use model::{
    GenerationRequest, GenerationResult, InvestmentIdea, RequestFeedback, RequestPriority,
    RequestStatus,
};
pub use services::lifecycle::RequestLifecycleManager;

#[cfg(test)]
mod model_tests;
