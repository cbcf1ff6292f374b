use serde::Deserialize;
use std::fs;

use crate::constants::lifecycle;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProcessingConfig {
    /// Hard deadline for one orchestration run; expiry fails the request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_result_ttl_days")]
    pub result_ttl_days: i64,
}

fn default_timeout_secs() -> u64 {
    lifecycle::DEFAULT_TIMEOUT_SECS
}

fn default_result_ttl_days() -> i64 {
    lifecycle::RESULT_TTL_DAYS
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            result_ttl_days: default_result_ttl_days(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CallbackClientConfig {
    /// Per-delivery HTTP timeout for callback POSTs.
    #[serde(default = "default_callback_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_callback_timeout_secs() -> u64 {
    10
}

impl Default for CallbackClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_callback_timeout_secs(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub llm_queue_size: usize,
    pub llm_max_concurrent: usize,

    pub llm: LlmConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub callback: CallbackClientConfig,

    /// Event bus capacity for tracking observers
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

fn default_bus_capacity() -> usize {
    1000
}

impl AppConfig {
    pub fn load() -> Self {
        let config_path = "config.yaml";
        let content = fs::read_to_string(config_path).expect("Failed to read config.yaml");

        // Strip BOM if present
        let content = content.strip_prefix("\u{feff}").unwrap_or(&content);

        let config: AppConfig = serde_yaml::from_str(content).expect("Failed to parse config.yaml");
        config
    }
}
