//! In-memory keyed stores for requests, results and feedback.
//!
//! Each request's map entry is only ever written by the submitting call
//! and by that request's own background task, so a concurrent keyed map
//! preserves the one-writer-per-key property without a global lock.

use std::sync::Arc;

use dashmap::DashMap;

use crate::model::{GenerationRequest, GenerationResult, RequestFeedback, RequestStatus};

/// Append-only log of requests keyed by id; entries are mutated in
/// place as status advances but never removed.
#[derive(Clone, Default)]
pub struct RequestStore {
    requests: Arc<DashMap<String, GenerationRequest>>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new request. Returns false (and leaves the store
    /// untouched) when the id is already taken.
    pub fn insert(&self, request: GenerationRequest) -> bool {
        match self.requests.entry(request.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(request);
                true
            }
        }
    }

    pub fn get(&self, request_id: &str) -> Option<GenerationRequest> {
        self.requests.get(request_id).map(|r| r.clone())
    }

    /// Get only if owned by `user_id`. Cross-user access is a miss, not
    /// an authorization error.
    pub fn get_owned(&self, request_id: &str, user_id: &str) -> Option<GenerationRequest> {
        self.requests
            .get(request_id)
            .filter(|r| r.user_id == user_id)
            .map(|r| r.clone())
    }

    /// Apply a mutation to the stored request, if present.
    pub fn update<F>(&self, request_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut GenerationRequest),
    {
        match self.requests.get_mut(request_id) {
            Some(mut entry) => {
                f(&mut entry);
                true
            }
            None => false,
        }
    }

    /// Set status only if the current status is non-terminal. Returns
    /// the new status on success, None if the request is missing or
    /// already terminal.
    pub fn transition(&self, request_id: &str, status: RequestStatus) -> Option<RequestStatus> {
        let mut entry = self.requests.get_mut(request_id)?;
        if entry.status.is_terminal() {
            return None;
        }
        entry.status = status;
        Some(status)
    }

    /// Snapshot of every request belonging to `user_id`.
    pub fn for_user(&self, user_id: &str) -> Vec<GenerationRequest> {
        self.requests
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// At most one result per request id.
#[derive(Clone, Default)]
pub struct ResultStore {
    results: Arc<DashMap<String, GenerationResult>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, result: GenerationResult) {
        self.results.insert(result.request_id.clone(), result);
    }

    pub fn get(&self, request_id: &str) -> Option<GenerationResult> {
        self.results.get(request_id).map(|r| r.clone())
    }

    /// Late feedback attachment, the only mutation a stored result ever
    /// sees. Returns false when no result exists yet.
    pub fn attach_feedback(&self, request_id: &str, feedback: RequestFeedback) -> bool {
        match self.results.get_mut(request_id) {
            Some(mut entry) => {
                entry.metadata.user_feedback = Some(feedback);
                true
            }
            None => false,
        }
    }
}

/// At most one feedback record per request id; last write wins.
#[derive(Clone, Default)]
pub struct FeedbackStore {
    feedback: Arc<DashMap<String, RequestFeedback>>,
}

impl FeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, feedback: RequestFeedback) {
        self.feedback.insert(feedback.request_id.clone(), feedback);
    }

    pub fn get(&self, request_id: &str) -> Option<RequestFeedback> {
        self.feedback.get(request_id).map(|f| f.clone())
    }
}
