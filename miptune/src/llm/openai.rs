//! OpenAI-compatible Chat Completions client implementing `LlmClient`.
//!
//! Talks to any Chat Completions endpoint: the real OpenAI API or a local
//! server (vLLM, llama.cpp) serving Qwen. Requires `OPENAI_API_KEY` (or an
//! explicit config); set `ModelConfig::api_base` for a non-default endpoint.
//!
//! **Interaction**: Implements `LlmClient`; used by `run_game` like `MockLlm`.
//! Depends on `async_openai`.

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::TunerError;
use crate::message::Message;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    Client,
};

use super::{LlmClient, ModelConfig};

/// Chat Completions client for the tuning loop.
///
/// Uses `OPENAI_API_KEY` from the environment by default; `ModelConfig::api_base`
/// overrides the endpoint so a local OpenAI-compatible server can be used.
pub struct ChatClient {
    client: Client<OpenAIConfig>,
    cfg: ModelConfig,
}

impl ChatClient {
    /// Build a client from `ModelConfig` (API key from `OPENAI_API_KEY` env).
    pub fn new(cfg: ModelConfig) -> Self {
        let mut openai_config = OpenAIConfig::new();
        if let Some(ref base) = cfg.api_base {
            openai_config = openai_config.with_api_base(base.clone());
        }
        Self {
            client: Client::with_config(openai_config),
            cfg,
        }
    }

    /// Build a client with an explicit `OpenAIConfig` (custom key or base URL).
    pub fn with_config(openai_config: OpenAIConfig, cfg: ModelConfig) -> Self {
        Self {
            client: Client::with_config(openai_config),
            cfg,
        }
    }

    /// Convert our `Message` list to request messages (text only, no tools).
    fn messages_to_request(messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m {
                Message::System(s) => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(s.as_str()),
                ),
                Message::User(s) => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(s.as_str()),
                ),
                Message::Assistant(s) => {
                    ChatCompletionRequestMessage::Assistant((s.as_str()).into())
                }
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for ChatClient {
    async fn chat(&self, messages: &[Message]) -> Result<String, TunerError> {
        let request_messages = Self::messages_to_request(messages);
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.cfg.model.clone());
        args.messages(request_messages);
        args.temperature(self.cfg.temperature);
        args.max_completion_tokens(self.cfg.max_tokens);

        let request = args
            .build()
            .map_err(|e| TunerError::Llm(format!("request build failed: {}", e)))?;

        debug!(
            model = %self.cfg.model,
            message_count = messages.len(),
            temperature = self.cfg.temperature,
            max_tokens = self.cfg.max_tokens,
            "chat completion create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(request = %js, "chat request body");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| TunerError::Llm(format!("API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TunerError::Llm("API returned no choices".to_string()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: ChatClient::new builds from a default ModelConfig without panicking.
    #[test]
    fn chat_client_new_creates_client() {
        let _ = ChatClient::new(ModelConfig::default());
        let _ = ChatClient::new(ModelConfig {
            api_base: Some("http://127.0.0.1:8000/v1".to_string()),
            ..ModelConfig::default()
        });
    }

    /// **Scenario**: chat() against an unreachable API base returns an error
    /// (no real API key needed).
    #[tokio::test]
    async fn chat_with_unreachable_base_returns_error() {
        let openai_config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base("https://127.0.0.1:1");
        let client = ChatClient::with_config(openai_config, ModelConfig::default());
        let messages = [Message::user("Hello")];

        let result = client.chat(&messages).await;

        assert!(result.is_err(), "chat against unreachable base should Err");
        assert!(matches!(result.unwrap_err(), TunerError::Llm(_)));
    }

    /// **Scenario**: chat() against the real API returns Ok when OPENAI_API_KEY is set.
    #[tokio::test]
    #[ignore = "Requires OPENAI_API_KEY; run with: cargo test -p miptune chat_with_real_api -- --ignored"]
    async fn chat_with_real_api_returns_ok() {
        std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set for this test");

        let model = std::env::var("MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let client = ChatClient::new(ModelConfig {
            model,
            ..ModelConfig::default()
        });
        let messages = [Message::user("Say exactly: ok")];

        let reply = client.chat(&messages).await.expect("real API call");
        assert!(!reply.is_empty(), "reply should have content");
    }
}
