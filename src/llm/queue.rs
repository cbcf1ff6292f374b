use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::info;

use super::{ChatOutput, LLMClient};
use crate::model::RequestPriority;

/// Priority lane for LLM requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    /// High lane: urgent/high requests and mid-pipeline continuations
    High,
    /// Normal lane: everything else
    Normal,
}

impl From<RequestPriority> for Priority {
    fn from(priority: RequestPriority) -> Self {
        match priority {
            RequestPriority::Urgent | RequestPriority::High => Priority::High,
            RequestPriority::Normal | RequestPriority::Low => Priority::Normal,
        }
    }
}

/// A request to be queued for LLM processing
struct QueuedRequest {
    system_prompt: String,
    user_input: String,
    response_tx: oneshot::Sender<Result<ChatOutput, String>>,
}

/// LLM Queue that limits concurrent requests and prioritizes the high
/// lane so in-flight pipelines are not starved by new submissions.
#[derive(Clone)]
pub struct LLMQueue {
    high_tx: mpsc::Sender<QueuedRequest>,
    normal_tx: mpsc::Sender<QueuedRequest>,
}

impl LLMQueue {
    /// Create a new LLM Queue with the given client and max concurrent requests
    pub fn new(client: LLMClient, max_concurrent: usize, queue_size: usize) -> Self {
        let (high_tx, high_rx) = mpsc::channel::<QueuedRequest>(queue_size);
        let (normal_tx, normal_rx) = mpsc::channel::<QueuedRequest>(queue_size);

        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        // Spawn the queue processor
        tokio::spawn(Self::process_queue(client, semaphore, high_rx, normal_rx));

        Self { high_tx, normal_tx }
    }

    /// Process queued requests, prioritizing the high lane
    async fn process_queue(
        client: LLMClient,
        semaphore: Arc<Semaphore>,
        mut high_rx: mpsc::Receiver<QueuedRequest>,
        mut normal_rx: mpsc::Receiver<QueuedRequest>,
    ) {
        info!(
            "📬 [QUEUE] LLM Queue processor started (max concurrent: {})",
            semaphore.available_permits()
        );

        loop {
            let request = tokio::select! {
                biased;

                Some(req) = high_rx.recv() => {
                    info!("📬 [QUEUE] Processing HIGH priority request");
                    req
                }
                Some(req) = normal_rx.recv() => {
                    info!("📬 [QUEUE] Processing NORMAL priority request");
                    req
                }
                else => {
                    // Both channels closed, exit
                    info!("📬 [QUEUE] All channels closed, shutting down");
                    break;
                }
            };

            // Acquire semaphore permit
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = request
                        .response_tx
                        .send(Err("Semaphore closed".to_string()));
                    continue;
                }
            };

            let available = semaphore.available_permits();
            info!("📬 [QUEUE] Acquired permit. {} slots remaining", available);

            // Spawn the actual LLM call
            let client_clone = client.clone();
            tokio::spawn(async move {
                let result = client_clone
                    .chat(&request.system_prompt, &request.user_input)
                    .await
                    .map_err(|e| e.to_string());

                let _ = request.response_tx.send(result);
                drop(permit); // Release permit when done
            });
        }
    }

    /// Send a chat request on the lane matching `priority`
    pub async fn chat(
        &self,
        system_prompt: &str,
        user_input: &str,
        priority: Priority,
    ) -> Result<ChatOutput, Box<dyn std::error::Error + Send + Sync>> {
        let (response_tx, response_rx) = oneshot::channel();

        let request = QueuedRequest {
            system_prompt: system_prompt.to_string(),
            user_input: user_input.to_string(),
            response_tx,
        };

        let send_result = match priority {
            Priority::High => self.high_tx.send(request).await,
            Priority::Normal => self.normal_tx.send(request).await,
        };

        if send_result.is_err() {
            return Err("Failed to queue LLM request".into());
        }

        match response_rx.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err("LLM request was cancelled".into()),
        }
    }
}
