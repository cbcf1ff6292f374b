//! Best-effort completion callback.
//!
//! Fires once, on the success path only, with a small summary payload
//! rather than the full result body. Non-2xx responses and transport
//! errors are logged and swallowed; delivery never changes stored state
//! and is never retried.

use std::time::Duration;

use chrono::Utc;
use reqwest::Method;
use serde::Serialize;
use tracing::{info, warn};

use crate::model::{CallbackConfig, GenerationResult};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub idea_count: usize,
    pub quality_score: f64,
    pub confidence_score: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub request_id: String,
    pub status: String,
    pub timestamp: String,
    pub result_summary: ResultSummary,
}

impl CallbackPayload {
    pub fn from_result(result: &GenerationResult) -> Self {
        Self {
            request_id: result.request_id.clone(),
            status: result.status.as_str().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            result_summary: ResultSummary {
                idea_count: result.investment_ideas.len(),
                quality_score: result.quality_score,
                confidence_score: result.confidence_score,
            },
        }
    }
}

#[derive(Clone)]
pub struct CallbackDispatcher {
    client: reqwest::Client,
}

impl CallbackDispatcher {
    pub fn new(timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Deliver the completion notification. At-most-once: every failure
    /// path lands here, logs, and returns.
    pub async fn dispatch(&self, config: &CallbackConfig, result: &GenerationResult) {
        let payload = CallbackPayload::from_result(result);

        let method = config
            .method
            .as_deref()
            .and_then(|m| m.parse::<Method>().ok())
            .unwrap_or(Method::POST);

        let mut request = self
            .client
            .request(method, &config.url)
            .header("Content-Type", "application/json");
        for (name, value) in &config.headers {
            request = request.header(name, value);
        }

        match request.json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!(
                    "📨 [CALLBACK] Delivered for {} ({})",
                    payload.request_id,
                    response.status()
                );
            }
            Ok(response) => {
                warn!(
                    "📨 [CALLBACK] Non-2xx for {}: {} (not retried)",
                    payload.request_id,
                    response.status()
                );
            }
            Err(e) => {
                warn!(
                    "📨 [CALLBACK] Delivery failed for {}: {} (not retried)",
                    payload.request_id, e
                );
            }
        }
    }
}
