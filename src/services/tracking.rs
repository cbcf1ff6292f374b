//! Request tracking collaborator.
//!
//! Records status transitions, pipeline steps and errors into an
//! in-memory per-request log, and republishes each entry on the event
//! bus for observers. Recording is synchronous, so within one request
//! entries appear in lifecycle order.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    bus::EventBus,
    events::{ErrorEvent, ErrorSeverity, Event, StatusEvent, StepEvent},
    model::RequestStatus,
};

#[derive(Clone)]
pub struct RequestTracker {
    log: Arc<Mutex<HashMap<String, Vec<Event>>>>,
    bus: EventBus,
}

impl RequestTracker {
    pub fn new(bus: EventBus) -> Self {
        Self {
            log: Arc::new(Mutex::new(HashMap::new())),
            bus,
        }
    }

    pub fn record_status(&self, request_id: &str, user_id: &str, status: RequestStatus) {
        let event = Event::Status(StatusEvent {
            request_id: request_id.to_string(),
            user_id: user_id.to_string(),
            status,
            timestamp: Utc::now(),
        });
        info!("📋 [TRACKING] {} -> {}", request_id, status.as_str());
        self.append(request_id, event);
    }

    pub fn record_step(&self, request_id: &str, step: &str, detail: &str) {
        let event = Event::Step(StepEvent {
            request_id: request_id.to_string(),
            step: step.to_string(),
            detail: detail.to_string(),
            timestamp: Utc::now(),
        });
        info!("📋 [TRACKING] {} step {}: {}", request_id, step, detail);
        self.append(request_id, event);
    }

    pub fn record_error(
        &self,
        request_id: &str,
        step: &str,
        severity: ErrorSeverity,
        message: &str,
        recoverable: bool,
    ) {
        let event = Event::Error(ErrorEvent {
            request_id: request_id.to_string(),
            step: step.to_string(),
            severity,
            message: message.to_string(),
            recoverable,
            timestamp: Utc::now(),
        });
        match severity {
            ErrorSeverity::Critical => {
                error!("📋 [TRACKING] {} CRITICAL at {}: {}", request_id, step, message);
            }
            _ => warn!("📋 [TRACKING] {} error at {}: {}", request_id, step, message),
        }
        self.append(request_id, event);
    }

    /// Everything recorded for one request, in recording order.
    pub fn events_for(&self, request_id: &str) -> Vec<Event> {
        self.log
            .lock()
            .map(|log| log.get(request_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn append(&self, request_id: &str, event: Event) {
        if let Ok(mut log) = self.log.lock() {
            log.entry(request_id.to_string())
                .or_default()
                .push(event.clone());
        }
        // Best-effort broadcast; no subscribers is fine.
        self.bus.publish(event).ok();
    }
}
