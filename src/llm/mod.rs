pub mod queue;

use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs},
    Client,
};
use std::error::Error;
use tracing::info;

pub use queue::{LLMQueue, Priority};

/// Token accounting for one chat call, folded into the result's
/// processing metrics.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// One chat completion plus its accounting.
#[derive(Clone, Debug)]
pub struct ChatOutput {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

#[derive(Clone)]
pub struct LLMClient {
    pub client: Client<OpenAIConfig>,
    pub model: String,
}

impl LLMClient {
    pub fn new(api_key: String, base_url: Option<String>, model: String) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url {
            config = config.with_api_base(url);
        }
        let client = Client::with_config(config);
        Self { client, model }
    }

    pub async fn chat(
        &self,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<ChatOutput, Box<dyn Error + Send + Sync>> {
        info!("🤖 Sending request to LLM (Model: {})...", self.model);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestMessage::System(
                    async_openai::types::ChatCompletionRequestSystemMessageArgs::default()
                        .content(system_prompt)
                        .build()?,
                ),
                ChatCompletionRequestMessage::User(
                    async_openai::types::ChatCompletionRequestUserMessageArgs::default()
                        .content(user_input)
                        .build()?,
                ),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        let usage = response
            .usage
            .as_ref()
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        info!("🤖 LLM Response received.");

        Ok(ChatOutput {
            content: response.choices[0].message.content.clone().unwrap_or_default(),
            model: self.model.clone(),
            usage,
        })
    }
}
