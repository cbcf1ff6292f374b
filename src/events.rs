//! Tracking event types broadcast on the event bus.
//!
//! One event per status transition, pipeline step, or error. Within a
//! single request these are emitted strictly in lifecycle order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::RequestStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub request_id: String,
    pub user_id: String,
    pub status: RequestStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub request_id: String,
    pub step: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub request_id: String,
    pub step: String,
    pub severity: ErrorSeverity,
    pub message: String,
    pub recoverable: bool,
    pub timestamp: DateTime<Utc>,
}

// Global Event Enum
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Status(StatusEvent),
    Step(StepEvent),
    Error(ErrorEvent),
}
