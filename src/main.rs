mod agents;
mod api;
mod bus;
mod config;
mod constants;
mod data;
mod error;
mod events;
mod llm;
mod messages;
mod model;
pub mod services;

use std::sync::Arc;

use api::{run_server, AppState};
use bus::EventBus;
use config::AppConfig;
use llm::{LLMClient, LLMQueue};
use services::callback::CallbackDispatcher;
use services::lifecycle::RequestLifecycleManager;
use services::orchestrator::AgentOrchestrator;
use services::tracking::RequestTracker;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Setup Logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    dotenvy::dotenv().ok();

    info!("Starting IdeaGen Rust...");

    // Load Configuration
    let config = AppConfig::load();
    info!("Loaded Configuration: {:?}", config);

    // Initialize Clients
    info!("Initializing AI Clients...");
    let api_key = config
        .llm
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .unwrap_or_default();
    let base_url = config.llm.base_url.clone();
    if let Some(url) = &base_url {
        info!("Using Custom OpenAI Base URL: {}", url);
    }

    let model = config.llm.model.clone();
    info!("Using LLM Model: {}", model);

    let llm_client = LLMClient::new(api_key, base_url, model);

    info!(
        "📬 Initializing LLM Queue (max concurrent: {}, size: {})...",
        config.llm_max_concurrent, config.llm_queue_size
    );
    let llm_queue = LLMQueue::new(llm_client, config.llm_max_concurrent, config.llm_queue_size);

    // Wire the lifecycle core
    let event_bus = EventBus::new(config.bus_capacity);
    let tracker = RequestTracker::new(event_bus.clone());
    let orchestrator = Arc::new(AgentOrchestrator::new(llm_queue));
    let callbacks = CallbackDispatcher::new(config.callback.timeout_secs);

    let lifecycle = RequestLifecycleManager::new(
        orchestrator,
        tracker,
        callbacks,
        config.processing.timeout_secs,
        config.processing.result_ttl_days,
    );

    let app_state = Arc::new(AppState { lifecycle, config });

    // Start API Server
    info!("Initializing API Server...");
    run_server(app_state).await;

    Ok(())
}
